pub mod client;
pub mod protocol;

pub use client::{
    DaemonClientError, focus_window, list_windows, list_windows_json, request_refresh,
    request_shutdown, send_command,
};
pub use protocol::{Response, WindowSummary};
