use chrono::{DateTime, Utc};

use winjump_core::daemon::WindowSummary;
use winjump_core::source::NativeHandle;

/// One tracked window.
///
/// `handle` is a weak reference: it may stop resolving at any time and every
/// use goes through the window source.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub id: String,
    pub handle: NativeHandle,
    pub pid: u32,
    pub app_name: String,
    pub title: String,
    pub last_used_at: DateTime<Utc>,
}

impl WindowDescriptor {
    pub fn new(
        id: impl Into<String>,
        handle: NativeHandle,
        pid: u32,
        app_name: impl Into<String>,
        title: impl Into<String>,
        last_used_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            handle,
            pid,
            app_name: app_name.into(),
            title: title.into(),
            last_used_at,
        }
    }

    /// Projection sent to clients by `list`.
    pub fn to_summary(&self) -> WindowSummary {
        WindowSummary {
            window_id: self.id.clone(),
            pid: self.pid,
            app_name: self.app_name.clone(),
            title: self.title.clone(),
            last_used: self.last_used_at.timestamp_micros() as f64 / 1_000_000.0,
        }
    }
}
