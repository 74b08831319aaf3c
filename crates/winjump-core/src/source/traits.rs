//! Window source trait definition.

use super::errors::SourceError;
use super::types::{EventSender, NativeHandle, ProcessEntry, WindowEntry};

/// Native window and process access consumed by the daemon.
///
/// Calls are synchronous and may block on the window system. The daemon
/// only calls them from its registry worker thread.
pub trait WindowSource: Send + Sync + 'static {
    /// Running processes that may own windows. Terminated processes are
    /// never reported.
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, SourceError>;

    /// Current windows of one process.
    ///
    /// Returns `SourceError::NotReady` when the process exists but cannot be
    /// enumerated yet (just launched).
    fn list_windows(&self, pid: u32) -> Result<Vec<WindowEntry>, SourceError>;

    /// Bring a process to the foreground.
    ///
    /// Returns `SourceError::ProcessNotFound` when the process is gone.
    fn activate(&self, pid: u32) -> Result<(), SourceError>;

    /// Raise and focus a window.
    fn raise(&self, handle: NativeHandle) -> Result<(), SourceError>;

    /// Whether the window is minimized. Unknown handles report `false`.
    fn is_minimized(&self, handle: NativeHandle) -> bool;

    fn set_minimized(&self, handle: NativeHandle, minimized: bool) -> Result<(), SourceError>;

    /// Start pushing process lifecycle notifications into `events`.
    ///
    /// Delivery happens on the source's own thread; the receiver decides
    /// where the events are handled.
    fn subscribe(&self, events: EventSender) -> Result<(), SourceError>;
}
