use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use winjump_core::config::ScanConfig;
use winjump_core::source::{SourceError, WindowEntry, WindowSource};

use crate::registry::{WindowDescriptor, WindowRegistry};

/// Which processes and windows are worth tracking.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    skip_processes: HashSet<String>,
    placeholder_title: String,
    min_title_length: usize,
}

impl ScanPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            skip_processes: config.skip_processes.iter().cloned().collect(),
            placeholder_title: config.placeholder_title.clone(),
            min_title_length: config.min_title_length,
        }
    }

    pub fn skips_process(&self, app_name: &str) -> bool {
        self.skip_processes.contains(app_name)
    }

    /// Titles are measured in characters, not bytes.
    pub fn tracks_title(&self, title: &str) -> bool {
        let title = title.trim();
        !title.is_empty()
            && title != self.placeholder_title
            && title.chars().count() >= self.min_title_length
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// Counts of what one scan changed in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

struct Reconciled {
    descriptors: Vec<WindowDescriptor>,
    unseen: Vec<String>,
    added: usize,
}

/// Enumerates windows through a `WindowSource` and reconciles the registry.
///
/// Window ids have the form `p{pid}_{n}`. On every scan of a process its
/// windows are matched against the known descriptors of that pid, first by
/// native handle, then by exact title. Matched windows keep their id; the
/// rest get the next per-pid number, which is never handed out twice.
pub struct Scanner {
    policy: ScanPolicy,
    /// Last number handed out per pid. Never pruned, so ids are not reused;
    /// growth is bounded by the pid space.
    next_index: HashMap<u32, u64>,
    permission_warned: bool,
}

impl Scanner {
    pub fn new(policy: ScanPolicy) -> Self {
        Self {
            policy,
            next_index: HashMap::new(),
            permission_warned: false,
        }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Rebuild the whole registry from the window source and swap it in.
    ///
    /// Processes whose windows are not ready keep their known descriptors.
    /// When access is denied the registry is left untouched.
    pub fn full_scan(
        &mut self,
        source: &dyn WindowSource,
        registry: &mut WindowRegistry,
    ) -> ScanReport {
        let processes = match source.list_processes() {
            Ok(processes) => processes,
            Err(e) => {
                self.scan_failed(None, &e);
                return ScanReport::default();
            }
        };

        let observed_at = registry.stamp();
        let mut next: Vec<WindowDescriptor> = Vec::new();
        let mut report = ScanReport::default();

        for process in processes {
            if self.policy.skips_process(&process.app_name) {
                continue;
            }
            let known = registry.windows_for_pid(process.pid);

            match source.list_windows(process.pid) {
                Ok(windows) => {
                    let reconciled = self.reconcile(
                        process.pid,
                        &process.app_name,
                        &known,
                        windows,
                        observed_at,
                        registry,
                    );
                    report.added += reconciled.added;
                    report.updated += reconciled.descriptors.len() - reconciled.added;
                    next.extend(reconciled.descriptors);
                }
                Err(SourceError::NotReady { .. }) => {
                    debug!(event = "daemon.scanner.not_ready", pid = process.pid);
                    next.extend(known);
                }
                Err(SourceError::ProcessNotFound { .. }) => {}
                Err(e @ SourceError::PermissionDenied { .. }) => {
                    self.scan_failed(Some(process.pid), &e);
                    return ScanReport::default();
                }
                Err(e) => {
                    self.scan_failed(Some(process.pid), &e);
                    next.extend(known);
                }
            }
        }

        let kept: HashSet<&str> = next.iter().map(|d| d.id.as_str()).collect();
        report.removed = registry
            .snapshot_sorted_by_recency()
            .iter()
            .filter(|d| !kept.contains(d.id.as_str()))
            .count();

        registry.replace_all(next);

        info!(
            event = "daemon.scanner.full_scan_completed",
            windows = registry.len(),
            added = report.added,
            updated = report.updated,
            removed = report.removed,
        );
        report
    }

    /// Reconcile the windows of one process. Other processes are untouched.
    pub fn scan_process(
        &mut self,
        pid: u32,
        source: &dyn WindowSource,
        registry: &mut WindowRegistry,
    ) -> ScanReport {
        let known = registry.windows_for_pid(pid);

        let app_name = match known.first() {
            Some(descriptor) => descriptor.app_name.clone(),
            None => match source.list_processes() {
                Ok(processes) => match processes.into_iter().find(|p| p.pid == pid) {
                    Some(process) => process.app_name,
                    None => {
                        debug!(event = "daemon.scanner.process_missing", pid = pid);
                        return ScanReport::default();
                    }
                },
                Err(e) => {
                    self.scan_failed(Some(pid), &e);
                    return ScanReport::default();
                }
            },
        };

        if self.policy.skips_process(&app_name) {
            return ScanReport::default();
        }

        let windows = match source.list_windows(pid) {
            Ok(windows) => windows,
            Err(SourceError::NotReady { .. }) => {
                debug!(event = "daemon.scanner.not_ready", pid = pid);
                return ScanReport::default();
            }
            Err(SourceError::ProcessNotFound { .. }) => {
                let removed = registry.remove_pid(pid);
                return ScanReport {
                    removed,
                    ..ScanReport::default()
                };
            }
            Err(e) => {
                self.scan_failed(Some(pid), &e);
                return ScanReport::default();
            }
        };

        let observed_at = registry.stamp();
        let reconciled = self.reconcile(pid, &app_name, &known, windows, observed_at, registry);

        let report = ScanReport {
            added: reconciled.added,
            updated: reconciled.descriptors.len() - reconciled.added,
            removed: reconciled.unseen.len(),
        };
        for descriptor in reconciled.descriptors {
            registry.upsert(descriptor);
        }
        for id in &reconciled.unseen {
            registry.remove(id);
        }

        debug!(
            event = "daemon.scanner.process_scan_completed",
            pid = pid,
            added = report.added,
            updated = report.updated,
            removed = report.removed,
        );
        report
    }

    fn reconcile(
        &mut self,
        pid: u32,
        app_name: &str,
        known: &[WindowDescriptor],
        windows: Vec<WindowEntry>,
        observed_at: DateTime<Utc>,
        registry: &WindowRegistry,
    ) -> Reconciled {
        let mut seen_handles = HashSet::new();
        let windows: Vec<WindowEntry> = windows
            .into_iter()
            .filter(|w| self.policy.tracks_title(&w.title))
            .filter(|w| seen_handles.insert(w.handle))
            .collect();

        let mut claimed = vec![false; known.len()];
        let mut matches: Vec<Option<usize>> = vec![None; windows.len()];

        for (wi, window) in windows.iter().enumerate() {
            if let Some(ki) =
                (0..known.len()).find(|&ki| !claimed[ki] && known[ki].handle == window.handle)
            {
                claimed[ki] = true;
                matches[wi] = Some(ki);
            }
        }
        for (wi, window) in windows.iter().enumerate() {
            if matches[wi].is_some() {
                continue;
            }
            if let Some(ki) =
                (0..known.len()).find(|&ki| !claimed[ki] && known[ki].title == window.title)
            {
                claimed[ki] = true;
                matches[wi] = Some(ki);
            }
        }

        let mut added = 0;
        let mut descriptors = Vec::with_capacity(windows.len());
        for (window, matched) in windows.into_iter().zip(matches) {
            let descriptor = match matched {
                Some(ki) => WindowDescriptor {
                    handle: window.handle,
                    app_name: app_name.to_string(),
                    title: window.title,
                    ..known[ki].clone()
                },
                None => {
                    added += 1;
                    let id = self.next_id(pid, registry);
                    WindowDescriptor::new(
                        id,
                        window.handle,
                        pid,
                        app_name,
                        window.title,
                        observed_at,
                    )
                }
            };
            descriptors.push(descriptor);
        }

        let unseen = known
            .iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(descriptor, _)| descriptor.id.clone())
            .collect();

        Reconciled {
            descriptors,
            unseen,
            added,
        }
    }

    fn next_id(&mut self, pid: u32, registry: &WindowRegistry) -> String {
        let counter = self.next_index.entry(pid).or_insert(0);
        loop {
            *counter += 1;
            let id = format!("p{pid}_{counter}");
            if !registry.contains(&id) {
                return id;
            }
        }
    }

    fn scan_failed(&mut self, pid: Option<u32>, error: &SourceError) {
        if let SourceError::PermissionDenied { .. } = error {
            if !self.permission_warned {
                self.permission_warned = true;
                warn!(
                    event = "daemon.scanner.permission_denied",
                    error = %error,
                    "Window access denied; scans return nothing until it is granted",
                );
            } else {
                debug!(event = "daemon.scanner.permission_denied", error = %error);
            }
            return;
        }
        warn!(
            event = "daemon.scanner.scan_failed",
            pid = ?pid,
            error = %error,
        );
    }
}
