use crate::{Phase, ProjectId, ProjectStatus, RowKey, SyncState, TaskStatus};

/// Rows per board page.
pub const PROJECTS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardViewModel {
    pub phase: Phase,
    pub loading: bool,
    pub last_error: Option<String>,
    pub total_projects: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<BoardRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub key: RowKey,
    pub id: ProjectId,
    pub name: String,
    pub created_on: String,
    pub status: ProjectStatus,
    /// Not yet acknowledged by the store.
    pub provisional: bool,
    pub tasks: Vec<TaskCell>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCell {
    pub key: &'static str,
    pub label: String,
    pub status: TaskStatus,
}

pub(crate) fn build_view(state: &SyncState, page: usize, page_size: usize) -> BoardViewModel {
    let page_size = page_size.max(1);
    let entries = state.entries();
    let page_count = entries.len().div_ceil(page_size);
    // The board cycles through pages, so any index wraps.
    let page = if page_count == 0 { 0 } else { page % page_count };

    let rows = entries
        .iter()
        .skip(page * page_size)
        .take(page_size)
        .map(|entry| {
            let project = &entry.project;
            let completion = project.completion();
            BoardRow {
                key: entry.key,
                id: project.id.clone(),
                name: project.name.clone(),
                created_on: project.created_at.format("%Y-%m-%d").to_string(),
                status: project.status,
                provisional: entry.provisional,
                tasks: project
                    .tasks
                    .iter()
                    .map(|task| TaskCell {
                        key: task.key(),
                        label: task.kind.label().to_string(),
                        status: task.status,
                    })
                    .collect(),
                completed_tasks: completion.done,
                total_tasks: completion.total,
            }
        })
        .collect();

    BoardViewModel {
        phase: state.phase(),
        loading: state.is_loading(),
        last_error: state.last_error().map(ToString::to_string),
        total_projects: entries.len(),
        page,
        page_count,
        rows,
    }
}
