//! Wire format of daemon responses.
//!
//! Requests are a single text line (`focus p42_1`). Every response is one
//! JSON object on one line. Field names follow the front-end's camelCase
//! convention (`windowID`, `appName`, `lastUsed`).

use serde::{Deserialize, Serialize};

/// One window as returned by `list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    #[serde(rename = "windowID")]
    pub window_id: String,
    pub pid: u32,
    #[serde(rename = "appName")]
    pub app_name: String,
    pub title: String,
    /// Seconds since the Unix epoch.
    #[serde(rename = "lastUsed")]
    pub last_used: f64,
}

/// Structured response to any request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<WindowSummary>>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            windows: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            windows: None,
        }
    }

    pub fn windows(windows: Vec<WindowSummary>) -> Self {
        Self {
            success: true,
            message: None,
            windows: Some(windows),
        }
    }

    /// Message text, or an empty string when the response carries none.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}
