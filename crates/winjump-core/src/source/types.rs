use serde::{Deserialize, Serialize};

/// Opaque reference to a window in the window source's own namespace.
///
/// Only the source that issued a handle can tell whether it still resolves;
/// holders must treat every use as fallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A running process that may own windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub app_name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, app_name: impl Into<String>) -> Self {
        Self {
            pid,
            app_name: app_name.into(),
        }
    }
}

/// One window as reported by a per-process enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub handle: NativeHandle,
    pub title: String,
}

impl WindowEntry {
    pub fn new(handle: NativeHandle, title: impl Into<String>) -> Self {
        Self {
            handle,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessEventKind {
    /// The process became the frontmost application.
    Activated,
    /// The process started. Its windows may not exist yet.
    Launched,
    /// The process exited.
    Terminated,
}

/// Process lifecycle notification pushed by a window source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessEvent {
    pub kind: ProcessEventKind,
    pub pid: u32,
}

impl ProcessEvent {
    pub fn activated(pid: u32) -> Self {
        Self {
            kind: ProcessEventKind::Activated,
            pid,
        }
    }

    pub fn launched(pid: u32) -> Self {
        Self {
            kind: ProcessEventKind::Launched,
            pid,
        }
    }

    pub fn terminated(pid: u32) -> Self {
        Self {
            kind: ProcessEventKind::Terminated,
            pid,
        }
    }
}

/// Channel a window source pushes lifecycle notifications into.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<ProcessEvent>;
