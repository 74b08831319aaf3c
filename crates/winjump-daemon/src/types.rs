use std::path::PathBuf;
use std::time::Duration;

use winjump_core::config::{FocusConfig, ScanConfig, WinjumpConfig};

/// Resolved runtime configuration of one daemon instance.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    /// Upper bound for reading one request line.
    pub request_timeout_ms: u64,
    /// How long shutdown waits for the registry worker to drain.
    pub shutdown_timeout_secs: u64,
    pub scan: ScanConfig,
    pub focus: FocusConfig,
}

impl DaemonConfig {
    pub fn from_config(config: &WinjumpConfig) -> Self {
        Self {
            socket_path: config.socket_path(),
            pid_path: config.pid_path(),
            request_timeout_ms: config.daemon.request_timeout_ms,
            shutdown_timeout_secs: 5,
            scan: config.scan.clone(),
            focus: config.focus.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.scan.launch_delay_ms)
    }

    /// `None` when the periodic backstop scan is disabled.
    pub fn scan_interval(&self) -> Option<Duration> {
        (self.scan.interval_secs > 0).then(|| Duration::from_secs(self.scan.interval_secs))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.focus.settle_delay_ms)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_config(&WinjumpConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_copies_sections() {
        let mut config = WinjumpConfig::default();
        config.daemon.socket_path = Some(PathBuf::from("/tmp/wj.sock"));
        config.scan.launch_delay_ms = 10;
        config.focus.settle_delay_ms = 0;

        let daemon = DaemonConfig::from_config(&config);
        assert_eq!(daemon.socket_path, PathBuf::from("/tmp/wj.sock"));
        assert_eq!(daemon.launch_delay(), Duration::from_millis(10));
        assert_eq!(daemon.settle_delay(), Duration::ZERO);
    }

    #[test]
    fn test_zero_interval_disables_backstop() {
        let mut config = DaemonConfig::default();
        assert_eq!(config.scan_interval(), Some(Duration::from_secs(30)));
        config.scan.interval_secs = 0;
        assert!(config.scan_interval().is_none());
    }
}
