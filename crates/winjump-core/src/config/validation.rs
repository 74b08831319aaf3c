use crate::config::types::WinjumpConfig;
use crate::errors::ConfigError;

/// Validate the configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` naming the first offending key.
pub fn validate_config(config: &WinjumpConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.daemon.socket_path
        && path.as_os_str().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "daemon.socket_path must not be empty".to_string(),
        });
    }

    if config.daemon.request_timeout_ms == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "daemon.request_timeout_ms must be greater than 0".to_string(),
        });
    }

    if config.scan.min_title_length == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "scan.min_title_length must be at least 1".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WinjumpConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_socket_path_rejected() {
        let mut config = WinjumpConfig::default();
        config.daemon.socket_path = Some(PathBuf::new());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("daemon.socket_path"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = WinjumpConfig::default();
        config.daemon.request_timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}
