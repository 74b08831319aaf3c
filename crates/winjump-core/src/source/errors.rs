use crate::errors::WinjumpError;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Windows of process '{pid}' are not ready yet")]
    NotReady { pid: u32 },

    #[error("Window access denied: {message}")]
    PermissionDenied { message: String },

    #[error("Process '{pid}' is not running")]
    ProcessNotFound { pid: u32 },

    #[error("Window handle {handle:#x} no longer resolves")]
    StaleHandle { handle: u64 },

    #[error("Window action failed: {message}")]
    ActionFailed { message: String },

    #[error("Window system connection failed: {message}")]
    ConnectionFailed { message: String },
}

impl WinjumpError for SourceError {
    fn error_code(&self) -> &'static str {
        match self {
            SourceError::NotReady { .. } => "SOURCE_NOT_READY",
            SourceError::PermissionDenied { .. } => "SOURCE_PERMISSION_DENIED",
            SourceError::ProcessNotFound { .. } => "SOURCE_PROCESS_NOT_FOUND",
            SourceError::StaleHandle { .. } => "SOURCE_STALE_HANDLE",
            SourceError::ActionFailed { .. } => "SOURCE_ACTION_FAILED",
            SourceError::ConnectionFailed { .. } => "SOURCE_CONNECTION_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, SourceError::PermissionDenied { .. })
    }
}
