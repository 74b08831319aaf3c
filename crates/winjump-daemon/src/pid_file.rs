use std::path::Path;

use tracing::{debug, warn};

use crate::errors::DaemonError;

/// Record the current process id at `path`, creating parent directories.
pub fn write_pid_file(path: &Path) -> Result<(), DaemonError> {
    let pid_error = |e: std::io::Error| DaemonError::PidFileError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(pid_error)?;
    }
    std::fs::write(path, format!("{}\n", std::process::id())).map_err(pid_error)?;

    debug!(event = "daemon.pid_file.written", path = %path.display());
    Ok(())
}

/// Pid stored at `path`, if the file exists and parses.
pub fn read_pid_file(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Remove the PID file. A missing file is not an error.
pub fn remove_pid_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(event = "daemon.pid_file.removed", path = %path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            event = "daemon.pid_file.remove_failed",
            path = %path.display(),
            error = %e,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("daemon.pid");

        write_pid_file(&path).unwrap();
        assert_eq!(read_pid_file(&path), Some(std::process::id()));

        remove_pid_file(&path);
        assert!(!path.exists());
        remove_pid_file(&path);
    }

    #[test]
    fn test_read_garbage_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.pid");
        std::fs::write(&path, "not a pid").unwrap();
        assert_eq!(read_pid_file(&path), None);
        assert_eq!(read_pid_file(&dir.path().join("missing")), None);
    }
}
