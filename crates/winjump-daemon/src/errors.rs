use winjump_core::errors::WinjumpError;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Failed to bind socket at '{path}': {message}")]
    BindFailed { path: String, message: String },

    #[error("Another daemon is already listening on '{path}'")]
    AlreadyRunning { path: String },

    #[error("Registry worker is not running")]
    WorkerUnavailable,

    #[error("PID file error at '{path}': {message}")]
    PidFileError { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WinjumpError for DaemonError {
    fn error_code(&self) -> &'static str {
        match self {
            DaemonError::BindFailed { .. } => "DAEMON_BIND_FAILED",
            DaemonError::AlreadyRunning { .. } => "DAEMON_ALREADY_RUNNING",
            DaemonError::WorkerUnavailable => "DAEMON_WORKER_UNAVAILABLE",
            DaemonError::PidFileError { .. } => "DAEMON_PID_FILE_ERROR",
            DaemonError::Io(_) => "DAEMON_IO_ERROR",
            DaemonError::Serialization(_) => "DAEMON_SERIALIZATION_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, DaemonError::AlreadyRunning { .. })
    }
}
