use crate::{ProjectId, ValidationError};

/// Failure surfaced by the sync layer to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("remote store rejected the request (HTTP {status}): {reason}")]
    RemoteRejected { status: u16, reason: String },
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("task `{task}` not found on project {project}")]
    TaskNotFound { project: ProjectId, task: String },
}

impl SyncError {
    /// The store acknowledged a mutation with a record for another project.
    pub fn foreign_answer(requested: &ProjectId, answered: &ProjectId) -> Self {
        SyncError::ValidationFailed(format!(
            "store answered for project {answered} instead of {requested}"
        ))
    }
}

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::ValidationFailed(err.to_string())
    }
}
