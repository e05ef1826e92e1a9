use crate::{Project, ProjectDraft, ProjectId, SyncError, TaskStatus};

/// Work the runtime must perform after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchProjects,
    LoadFallback,
    /// Overwrite the fallback cache. `generation` grows with every save the
    /// state issues; a save older than one already written is superseded.
    SaveSnapshot {
        generation: u64,
        projects: Vec<Project>,
    },
    CreateProject {
        provisional_id: ProjectId,
        draft: ProjectDraft,
    },
    DeleteProject {
        id: ProjectId,
    },
    UpdateTaskStatus {
        id: ProjectId,
        task_key: String,
        status: TaskStatus,
    },
    /// The request was refused locally; hand the error back to the caller.
    Rejected(SyncError),
}
