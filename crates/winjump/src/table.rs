use chrono::{DateTime, Local};

use winjump_core::daemon::WindowSummary;

pub struct TableFormatter {
    id_width: usize,
    app_width: usize,
    title_width: usize,
    used_width: usize,
}

impl TableFormatter {
    pub fn new(windows: &[WindowSummary]) -> Self {
        let id_width = windows
            .iter()
            .map(|w| w.window_id.chars().count())
            .max()
            .unwrap_or(6)
            .clamp(2, 16);
        let app_width = windows
            .iter()
            .map(|w| w.app_name.chars().count())
            .max()
            .unwrap_or(12)
            .clamp(3, 24);

        Self {
            id_width,
            app_width,
            title_width: 50,
            used_width: 19,
        }
    }

    pub fn print_table(&self, windows: &[WindowSummary]) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!(
            "│ {} │ {} │ {} │ {} │",
            truncate("ID", self.id_width),
            truncate("App", self.app_width),
            truncate("Title", self.title_width),
            truncate("Last used", self.used_width),
        );
        println!("{}", self.border('├', '┼', '┤'));
        for window in windows {
            println!("{}", self.row(window));
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn row(&self, window: &WindowSummary) -> String {
        format!(
            "│ {} │ {} │ {} │ {} │",
            truncate(&window.window_id, self.id_width),
            truncate(&window.app_name, self.app_width),
            truncate(&window.title, self.title_width),
            truncate(&format_last_used(window.last_used), self.used_width),
        )
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = [
            self.id_width,
            self.app_width,
            self.title_width,
            self.used_width,
        ]
        .iter()
        .map(|w| "─".repeat(w + 2))
        .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }
}

/// Epoch seconds rendered in local time.
fn format_last_used(epoch_secs: f64) -> String {
    let micros = (epoch_secs * 1_000_000.0) as i64;
    DateTime::from_timestamp_micros(micros)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        // Cut at character boundaries, not bytes
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
