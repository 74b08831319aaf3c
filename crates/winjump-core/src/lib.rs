//! winjump-core: Core library for jumping to open windows by name
//!
//! This library provides the pieces shared by the daemon and the CLI:
//! the window source capability, configuration and the IPC client.
//!
//! # Main Entry Points
//!
//! - [`source`] - Window source capability and the X11 implementation
//! - [`config`] - Configuration management
//! - [`daemon`] - Synchronous client for the running daemon
//! - [`logging`] - Structured logging setup

pub mod config;
pub mod daemon;
pub mod errors;
pub mod logging;
pub mod source;

// Re-export commonly used types at crate root for convenience
pub use config::WinjumpConfig;
pub use errors::WinjumpError;
pub use source::{
    NativeHandle, ProcessEntry, ProcessEvent, ProcessEventKind, SourceError, WindowEntry,
    WindowSource,
};

// Re-export logging initialization
pub use logging::init_logging;
