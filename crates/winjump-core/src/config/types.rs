//! Configuration type definitions for winjump.
//!
//! These types are deserialized from `~/.winjump/config.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [daemon]
//! socket_path = "/tmp/winjump.sock"
//! request_timeout_ms = 5000
//!
//! [scan]
//! interval_secs = 30
//! launch_delay_ms = 1000
//! rescan_on_activate = true
//! min_title_length = 2
//! placeholder_title = "Untitled"
//!
//! [focus]
//! settle_delay_ms = 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime paths for winjump.
///
/// Derived from the environment, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for all winjump data (default: ~/.winjump)
    pub winjump_dir: PathBuf,
}

/// Main configuration loaded from the TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WinjumpConfig {
    /// Daemon endpoint settings
    #[serde(default)]
    pub daemon: DaemonSettings,

    /// Scanner and event bridge settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Focus controller settings
    #[serde(default)]
    pub focus: FocusConfig,
}

/// Daemon endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonSettings {
    /// Unix socket path. Default: `~/.winjump/daemon.sock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,

    /// PID file path. Default: `~/.winjump/daemon.pid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_path: Option<PathBuf>,

    /// Upper bound for reading one request line from a client.
    #[serde(default = "super::defaults::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Scanner and event bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Seconds between periodic full scans. `0` disables the backstop.
    #[serde(default = "super::defaults::default_scan_interval_secs")]
    pub interval_secs: u64,

    /// Delay before rescanning a process reported as launched.
    #[serde(default = "super::defaults::default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Rescan a process when it is activated, to pick up new windows.
    #[serde(default = "super::defaults::default_rescan_on_activate")]
    pub rescan_on_activate: bool,

    /// Windows with shorter titles are not tracked.
    #[serde(default = "super::defaults::default_min_title_length")]
    pub min_title_length: usize,

    /// Title some toolkits give windows before they are named.
    #[serde(default = "super::defaults::default_placeholder_title")]
    pub placeholder_title: String,

    /// Process names that are never scanned. Replaces the built-in list.
    #[serde(default = "super::defaults::default_skip_processes")]
    pub skip_processes: Vec<String>,
}

/// Focus controller settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusConfig {
    /// Pause between activating a process and raising its window.
    #[serde(default = "super::defaults::default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winjump_config_serialization() {
        let config = WinjumpConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: WinjumpConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scan_section_keeps_defaults() {
        let toml_str = r#"
[scan]
interval_secs = 0
"#;
        let config: WinjumpConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scan.interval_secs, 0);
        assert_eq!(config.scan.min_title_length, 2);
        assert!(config.scan.rescan_on_activate);
        assert!(!config.scan.skip_processes.is_empty());
        assert_eq!(config.focus.settle_delay_ms, 50);
    }

    #[test]
    fn test_daemon_paths_deserialize() {
        let toml_str = r#"
[daemon]
socket_path = "/tmp/wj.sock"
"#;
        let config: WinjumpConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.daemon.socket_path,
            Some(PathBuf::from("/tmp/wj.sock"))
        );
        assert!(config.daemon.pid_path.is_none());
        assert_eq!(config.daemon.request_timeout_ms, 5000);
    }
}
