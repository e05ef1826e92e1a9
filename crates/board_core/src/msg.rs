use chrono::{DateTime, Utc};

use crate::{Project, ProjectDraft, ProjectId, SyncError, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session start; triggers the first load exactly once.
    Mounted,
    /// Periodic timer fired or presentation code forced a refresh.
    RefreshRequested,
    /// Remote `list()` finished.
    RefreshCompleted(Result<Vec<Project>, SyncError>),
    /// Snapshot read back from the fallback cache after a failed first load.
    FallbackLoaded(Vec<Project>),
    /// Admin form submitted a new project.
    CreateRequested {
        draft: ProjectDraft,
        created_at: DateTime<Utc>,
    },
    CreateCompleted {
        provisional_id: ProjectId,
        result: Result<Project, SyncError>,
    },
    DeleteRequested {
        id: ProjectId,
    },
    DeleteCompleted {
        id: ProjectId,
        result: Result<(), SyncError>,
    },
    TaskStatusRequested {
        id: ProjectId,
        task_key: String,
        status: TaskStatus,
    },
    TaskStatusCompleted {
        id: ProjectId,
        result: Result<Project, SyncError>,
    },
}
