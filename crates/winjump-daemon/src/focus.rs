use std::time::Duration;

use tracing::{debug, info, warn};

use winjump_core::source::{NativeHandle, SourceError, WindowSource};

use crate::registry::WindowRegistry;
use crate::scanner::Scanner;

/// Terminal state of one focus request. Reported in-band to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    Focused { title: String },
    /// The first raise failed and the window was found again by rescanning.
    FocusedAfterRefresh { title: String },
    NotFound { window_id: String },
    ProcessGone { app_name: String },
    StaleUnresolvable { title: String },
}

impl FocusOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            FocusOutcome::Focused { .. } | FocusOutcome::FocusedAfterRefresh { .. }
        )
    }

    pub fn message(&self) -> String {
        match self {
            FocusOutcome::Focused { title } => format!("Focused window: {title}"),
            FocusOutcome::FocusedAfterRefresh { title } => {
                format!("Focused window: {title} (after refresh)")
            }
            FocusOutcome::NotFound { window_id } => {
                format!("Window no longer exists: {window_id}")
            }
            FocusOutcome::ProcessGone { app_name } => {
                format!("Application is no longer running: {app_name}")
            }
            FocusOutcome::StaleUnresolvable { title } => {
                format!("Window could not be focused and was removed: {title}")
            }
        }
    }
}

/// Runs the resolve / activate / raise / retry-once flow for `focus`.
#[derive(Debug, Clone)]
pub struct FocusController {
    settle_delay: Duration,
}

impl FocusController {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    /// Focus the window with the given id.
    ///
    /// Blocks on native calls and on the settle delay, so this must run on
    /// the registry worker thread. At most two raises are attempted.
    pub fn focus(
        &self,
        window_id: &str,
        source: &dyn WindowSource,
        registry: &mut WindowRegistry,
        scanner: &mut Scanner,
    ) -> FocusOutcome {
        let Some(descriptor) = registry.get(window_id).cloned() else {
            debug!(event = "daemon.focus.not_found", window_id = window_id);
            return FocusOutcome::NotFound {
                window_id: window_id.to_string(),
            };
        };

        match source.activate(descriptor.pid) {
            Ok(()) => {}
            Err(SourceError::ProcessNotFound { .. }) => {
                let evicted = registry.remove_pid(descriptor.pid);
                info!(
                    event = "daemon.focus.process_gone",
                    window_id = window_id,
                    pid = descriptor.pid,
                    evicted = evicted,
                );
                return FocusOutcome::ProcessGone {
                    app_name: descriptor.app_name,
                };
            }
            Err(e) => {
                warn!(
                    event = "daemon.focus.activate_failed",
                    window_id = window_id,
                    pid = descriptor.pid,
                    error = %e,
                );
            }
        }

        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }

        match raise_window(source, descriptor.handle) {
            Ok(()) => {
                registry.touch(&descriptor.id);
                return FocusOutcome::Focused {
                    title: descriptor.title,
                };
            }
            Err(e) => {
                debug!(
                    event = "daemon.focus.raise_failed",
                    window_id = window_id,
                    handle = %descriptor.handle,
                    error = %e,
                );
            }
        }

        scanner.scan_process(descriptor.pid, source, registry);

        // A surviving id is the same window, even among duplicate titles.
        // Match by (pid, title) only once the id is gone.
        let refreshed = registry.get(window_id).cloned().or_else(|| {
            registry
                .find_by_pid_and_title(descriptor.pid, &descriptor.title)
                .cloned()
        });
        if let Some(refreshed) = refreshed {
            match raise_window(source, refreshed.handle) {
                Ok(()) => {
                    registry.touch(&refreshed.id);
                    info!(
                        event = "daemon.focus.retry_succeeded",
                        window_id = window_id,
                        refreshed_id = refreshed.id.as_str(),
                        handle = %refreshed.handle,
                    );
                    return FocusOutcome::FocusedAfterRefresh {
                        title: refreshed.title,
                    };
                }
                Err(e) => {
                    debug!(
                        event = "daemon.focus.retry_failed",
                        window_id = window_id,
                        error = %e,
                    );
                }
            }
        }

        registry.remove(window_id);
        warn!(
            event = "daemon.focus.stale_evicted",
            window_id = window_id,
            title = descriptor.title.as_str(),
        );
        FocusOutcome::StaleUnresolvable {
            title: descriptor.title,
        }
    }
}

/// Raise a window, restoring it first when minimized.
fn raise_window(source: &dyn WindowSource, handle: NativeHandle) -> Result<(), SourceError> {
    if source.is_minimized(handle) {
        source.set_minimized(handle, false)?;
    }
    source.raise(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanPolicy;
    use crate::testing::FakeSource;

    struct Fixture {
        source: FakeSource,
        registry: WindowRegistry,
        scanner: Scanner,
        controller: FocusController,
    }

    impl Fixture {
        /// Process 5 "Editor" with "file.txt" (handle 100) and "notes.md" (handle 101).
        fn new() -> Self {
            let source = FakeSource::new();
            source.add_process(5, "Editor");
            source.add_window(5, 100, "file.txt");
            source.add_window(5, 101, "notes.md");

            let mut registry = WindowRegistry::new();
            let mut scanner = Scanner::new(ScanPolicy::default());
            scanner.full_scan(&source, &mut registry);

            Self {
                source,
                registry,
                scanner,
                controller: FocusController::new(Duration::ZERO),
            }
        }

        fn focus(&mut self, id: &str) -> FocusOutcome {
            self.controller
                .focus(id, &self.source, &mut self.registry, &mut self.scanner)
        }
    }

    #[test]
    fn test_focus_live_window_bumps_recency() {
        let mut fx = Fixture::new();
        let before = fx.registry.get("p5_1").unwrap().last_used_at;

        let outcome = fx.focus("p5_1");

        assert_eq!(outcome.message(), "Focused window: file.txt");
        assert!(outcome.is_success());
        assert!(fx.registry.get("p5_1").unwrap().last_used_at > before);
        assert_eq!(fx.source.activate_calls(), vec![5]);
        assert_eq!(fx.source.raise_calls(), vec![100]);
    }

    #[test]
    fn test_focus_moves_window_to_front_of_list() {
        let mut fx = Fixture::new();
        fx.focus("p5_2");
        let first = fx.registry.snapshot_sorted_by_recency()[0].id.clone();
        assert_eq!(first, "p5_2");
    }

    #[test]
    fn test_focus_unknown_id() {
        let mut fx = Fixture::new();
        let outcome = fx.focus("ghost");

        assert_eq!(outcome.message(), "Window no longer exists: ghost");
        assert!(!outcome.is_success());
        assert!(fx.source.activate_calls().is_empty());
    }

    #[test]
    fn test_focus_on_dead_process_evicts_all_its_windows() {
        let mut fx = Fixture::new();
        fx.source.kill(5);

        let outcome = fx.focus("p5_1");

        assert_eq!(outcome.message(), "Application is no longer running: Editor");
        assert!(fx.registry.is_empty());
        assert!(fx.source.raise_calls().is_empty());
    }

    #[test]
    fn test_stale_handle_recovered_by_one_retry() {
        let mut fx = Fixture::new();
        fx.source.replace_handle(5, 100, 150);

        let outcome = fx.focus("p5_1");

        assert_eq!(outcome, FocusOutcome::FocusedAfterRefresh {
            title: "file.txt".to_string()
        });
        assert_eq!(outcome.message(), "Focused window: file.txt (after refresh)");
        assert_eq!(fx.source.raise_calls(), vec![100, 150]);
        assert_eq!(fx.registry.get("p5_1").unwrap().handle.as_u64(), 150);
    }

    #[test]
    fn test_unresolvable_window_is_evicted() {
        let mut fx = Fixture::new();
        fx.source.remove_window(5, 100);

        let outcome = fx.focus("p5_1");

        assert_eq!(
            outcome.message(),
            "Window could not be focused and was removed: file.txt"
        );
        assert!(fx.registry.get("p5_1").is_none());
        assert!(fx.registry.get("p5_2").is_some());
        assert_eq!(fx.source.raise_calls(), vec![100]);
    }

    #[test]
    fn test_retry_is_attempted_only_once() {
        let mut fx = Fixture::new();
        fx.source.fail_raise(100);

        let outcome = fx.focus("p5_1");

        assert!(matches!(outcome, FocusOutcome::StaleUnresolvable { .. }));
        assert_eq!(fx.source.raise_calls(), vec![100, 100]);
        assert!(fx.registry.get("p5_1").is_none());
    }

    #[test]
    fn test_stale_retry_keeps_identity_among_duplicate_titles() {
        let source = FakeSource::new();
        source.add_process(5, "Browser");
        source.add_window(5, 100, "New Tab");
        source.add_window(5, 101, "New Tab");
        let mut registry = WindowRegistry::new();
        let mut scanner = Scanner::new(ScanPolicy::default());
        scanner.full_scan(&source, &mut registry);
        let controller = FocusController::new(Duration::ZERO);

        source.replace_handle(5, 101, 151);
        let outcome = controller.focus("p5_2", &source, &mut registry, &mut scanner);

        assert!(matches!(outcome, FocusOutcome::FocusedAfterRefresh { .. }));
        assert_eq!(source.raise_calls(), vec![101, 151]);
        assert_eq!(registry.get("p5_2").unwrap().handle.as_u64(), 151);
        assert_eq!(registry.snapshot_sorted_by_recency()[0].id, "p5_2");
    }

    #[test]
    fn test_activation_error_still_raises() {
        let mut fx = Fixture::new();
        fx.source.fail_activate(5);

        let outcome = fx.focus("p5_1");

        assert_eq!(outcome.message(), "Focused window: file.txt");
        assert_eq!(fx.source.activate_calls(), vec![5]);
        assert_eq!(fx.source.raise_calls(), vec![100]);
    }

    #[test]
    fn test_minimized_window_is_restored_before_raise() {
        let mut fx = Fixture::new();
        fx.source.set_minimized_flag(101);

        let outcome = fx.focus("p5_2");

        assert!(outcome.is_success());
        assert_eq!(fx.source.unminimize_calls(), vec![101]);
        assert_eq!(fx.source.raise_calls(), vec![101]);
    }
}
