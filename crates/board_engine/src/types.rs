use board_core::SyncError;

/// Failure of a single remote store round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure: connect error, reset, timeout.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    /// The store answered with a non-2xx status.
    #[error("remote store rejected the request (HTTP {status}): {reason}")]
    Rejected { status: u16, reason: String },
    /// A 2xx answer whose body is not the expected JSON shape.
    #[error("malformed response from remote store: {0}")]
    Malformed(String),
    #[error("invalid remote store base url `{0}`")]
    InvalidBaseUrl(String),
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unavailable(message) => SyncError::RemoteUnavailable(message),
            RemoteError::Rejected { status, reason } => SyncError::RemoteRejected { status, reason },
            RemoteError::Malformed(message) => SyncError::ValidationFailed(message),
            err @ RemoteError::InvalidBaseUrl(_) => SyncError::RemoteUnavailable(err.to_string()),
        }
    }
}
