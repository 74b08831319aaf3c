//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::config::types::{Config, DaemonSettings, FocusConfig, ScanConfig};

/// Desktop-shell and system-chrome processes that own windows nobody
/// wants to jump to.
pub const DEFAULT_SKIP_PROCESSES: &[&str] = &[
    "Dock",
    "SystemUIServer",
    "ControlCenter",
    "NotificationCenter",
    "WindowManager",
    "loginwindow",
    "Spotlight",
    "gnome-shell",
    "plasmashell",
    "xfdesktop",
    "xfce4-panel",
    "polybar",
    "waybar",
    "tint2",
];

pub fn default_request_timeout_ms() -> u64 {
    5000
}

/// Periodic full scan every 30 seconds, as a backstop for missed notifications.
pub fn default_scan_interval_secs() -> u64 {
    30
}

/// New processes usually need about a second before their first window exists.
pub fn default_launch_delay_ms() -> u64 {
    1000
}

pub fn default_rescan_on_activate() -> bool {
    true
}

pub fn default_min_title_length() -> usize {
    2
}

pub fn default_placeholder_title() -> String {
    "Untitled".to_string()
}

pub fn default_skip_processes() -> Vec<String> {
    DEFAULT_SKIP_PROCESSES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn default_settle_delay_ms() -> u64 {
    50
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            pid_path: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scan_interval_secs(),
            launch_delay_ms: default_launch_delay_ms(),
            rescan_on_activate: default_rescan_on_activate(),
            min_title_length: default_min_title_length(),
            placeholder_title: default_placeholder_title(),
            skip_processes: default_skip_processes(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let winjump_dir = match dirs::home_dir() {
            Some(home) => home.join(".winjump"),
            None => {
                eprintln!(
                    "Warning: Could not find home directory. Set HOME environment variable. \
                    Using fallback directory."
                );
                std::env::temp_dir().join(".winjump")
            }
        };

        Self { winjump_dir }
    }
}
