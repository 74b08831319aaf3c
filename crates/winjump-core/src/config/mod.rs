//! # Configuration System
//!
//! TOML configuration for the winjump daemon and CLI.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.winjump/config.toml`
//! 3. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use winjump_core::config::WinjumpConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WinjumpConfig::load_hierarchy()?;
//!     println!("socket: {}", config.socket_path().display());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

use std::path::PathBuf;

pub use defaults::DEFAULT_SKIP_PROCESSES;
pub use types::{Config, DaemonSettings, FocusConfig, ScanConfig, WinjumpConfig};
pub use validation::validate_config;

impl WinjumpConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }

    pub fn socket_path(&self) -> PathBuf {
        loading::socket_path(self)
    }

    pub fn pid_path(&self) -> PathBuf {
        loading::pid_path(self)
    }
}
