//! Configuration loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.winjump/config.toml`
//! 3. **CLI arguments** - Command-line flags (highest priority, applied by the caller)

use crate::config::types::{Config, WinjumpConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load configuration from defaults and the user config file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed, or if
/// validation fails. A missing config file is not an error.
pub fn load_hierarchy() -> Result<WinjumpConfig, ConfigError> {
    let path = user_config_path()?;
    load_from(&path)
}

/// Load configuration from an explicit path, falling back to defaults when
/// the file does not exist.
pub fn load_from(path: &Path) -> Result<WinjumpConfig, ConfigError> {
    let config = match load_config_file(path) {
        Ok(config) => config,
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                event = "core.config.file_not_found",
                path = %path.display(),
            );
            WinjumpConfig::default()
        }
        Err(e) => return Err(e),
    };

    validate_config(&config)?;
    Ok(config)
}

/// Path of the user config file (`~/.winjump/config.toml`).
pub fn user_config_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home_dir.join(".winjump").join("config.toml"))
}

/// Load a configuration file from the given path.
fn load_config_file(path: &Path) -> Result<WinjumpConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Resolve the daemon socket path: configured value or `~/.winjump/daemon.sock`.
pub fn socket_path(config: &WinjumpConfig) -> PathBuf {
    config
        .daemon
        .socket_path
        .clone()
        .unwrap_or_else(|| Config::default().winjump_dir.join("daemon.sock"))
}

/// Resolve the PID file path: configured value or `~/.winjump/daemon.pid`.
pub fn pid_path(config: &WinjumpConfig) -> PathBuf {
    config
        .daemon
        .pid_path
        .clone()
        .unwrap_or_else(|| Config::default().winjump_dir.join("daemon.pid"))
}
