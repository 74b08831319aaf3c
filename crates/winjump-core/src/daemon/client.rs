//! Synchronous IPC client for communicating with the winjump daemon.
//!
//! The client itself is synchronous and uses `std::os::unix::net::UnixStream`.
//! Each call opens a fresh connection, writes one command line and reads one
//! JSON response line; the daemon closes the connection afterwards.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::daemon::protocol::{Response, WindowSummary};
use crate::errors::WinjumpError;

/// Failure talking to the window daemon. In-band `success: false`
/// responses are not errors, except where a caller needs the payload.
#[derive(Debug, thiserror::Error)]
pub enum DaemonClientError {
    #[error("No winjump daemon is listening at {path}")]
    NotRunning { path: String },

    #[error("Could not reach the winjump daemon: {message}")]
    ConnectionFailed { message: String },

    #[error("Daemon rejected the request: {message}")]
    Rejected { message: String },

    #[error("Malformed daemon response: {message}")]
    ProtocolError { message: String },

    #[error("Socket IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WinjumpError for DaemonClientError {
    fn error_code(&self) -> &'static str {
        match self {
            DaemonClientError::NotRunning { .. } => "DAEMON_NOT_RUNNING",
            DaemonClientError::ConnectionFailed { .. } => "DAEMON_CONNECTION_FAILED",
            DaemonClientError::Rejected { .. } => "DAEMON_REQUEST_REJECTED",
            DaemonClientError::ProtocolError { .. } => "DAEMON_PROTOCOL_ERROR",
            DaemonClientError::Io(_) => "DAEMON_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, DaemonClientError::NotRunning { .. })
    }
}

/// Open a fresh stream to the daemon with read and write deadlines.
fn open_stream(socket_path: &Path) -> Result<UnixStream, DaemonClientError> {
    if !socket_path.exists() {
        return Err(DaemonClientError::NotRunning {
            path: socket_path.display().to_string(),
        });
    }

    let stream = UnixStream::connect(socket_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::ConnectionRefused {
            DaemonClientError::NotRunning {
                path: socket_path.display().to_string(),
            }
        } else {
            DaemonClientError::ConnectionFailed {
                message: e.to_string(),
            }
        }
    })?;

    // Focus may wait on a process rescan; give it room
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    Ok(stream)
}

/// Send one command line and return the raw response line.
fn send_line(socket_path: &Path, command: &str) -> Result<String, DaemonClientError> {
    let mut stream = open_stream(socket_path)?;

    writeln!(stream, "{}", command)?;
    stream.flush()?;

    let mut reader = BufReader::new(&stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(DaemonClientError::ProtocolError {
            message: "Empty response from daemon".to_string(),
        });
    }

    Ok(line.trim_end().to_string())
}

/// Send one command and decode the structured response.
///
/// In-band failures (`success: false`) are returned as `Ok`; callers decide
/// whether they are fatal.
pub fn send_command(socket_path: &Path, command: &str) -> Result<Response, DaemonClientError> {
    debug!(event = "core.daemon.command_started", command = command);

    let line = send_line(socket_path, command)?;
    let response: Response =
        serde_json::from_str(&line).map_err(|e| DaemonClientError::ProtocolError {
            message: format!("Invalid JSON response: {}", e),
        })?;

    debug!(
        event = "core.daemon.command_completed",
        command = command,
        success = response.success,
    );
    Ok(response)
}

/// List tracked windows, most recently used first.
pub fn list_windows(socket_path: &Path) -> Result<Vec<WindowSummary>, DaemonClientError> {
    let response = send_command(socket_path, "list")?;
    if !response.success {
        return Err(DaemonClientError::Rejected {
            message: response.message_or_default().to_string(),
        });
    }
    response
        .windows
        .ok_or_else(|| DaemonClientError::ProtocolError {
            message: "Response missing windows field".to_string(),
        })
}

/// Raw JSON document returned by `list-json`, for piping into other tools.
pub fn list_windows_json(socket_path: &Path) -> Result<String, DaemonClientError> {
    send_line(socket_path, "list-json")
}

/// Ask the daemon to focus a window.
pub fn focus_window(socket_path: &Path, window_id: &str) -> Result<Response, DaemonClientError> {
    info!(event = "core.daemon.focus_started", window_id = window_id);
    let response = send_command(socket_path, &format!("focus {}", window_id))?;
    info!(
        event = "core.daemon.focus_completed",
        window_id = window_id,
        success = response.success,
    );
    Ok(response)
}

/// Trigger an asynchronous full rescan.
pub fn request_refresh(socket_path: &Path) -> Result<Response, DaemonClientError> {
    send_command(socket_path, "refresh")
}

/// Send `quit`; the daemon answers before it stops listening.
pub fn request_shutdown(socket_path: &Path) -> Result<(), DaemonClientError> {
    let response = send_command(socket_path, "quit")?;
    info!(
        event = "core.daemon.quit_sent",
        message = response.message_or_default(),
    );
    Ok(())
}
