//! winjump-daemon: tracks open windows and focuses them on request.
//!
//! The registry of windows is owned by a single worker thread. The socket
//! server, the process event bridge and the periodic scan timer only ever
//! send it commands.

pub mod errors;
pub mod events;
pub mod focus;
pub mod pid_file;
pub mod protocol;
pub mod registry;
pub mod scanner;
pub mod server;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::DaemonError;
pub use focus::{FocusController, FocusOutcome};
pub use registry::{WindowDescriptor, WindowRegistry};
pub use scanner::{ScanPolicy, ScanReport, Scanner};
pub use server::{run_server, run_server_until};
pub use types::DaemonConfig;
pub use worker::{RegistryCommand, RegistryHandle, WindowManager, spawn_worker};
