//! Polling process watcher.
//!
//! Turns successive snapshots of the window-owning process set and the
//! active window's owner into launch, termination and activation
//! notifications. Processes without windows never show up, so background
//! churn does not reach the registry.

use std::collections::HashSet;

use super::types::ProcessEvent;

/// Tracks the last observed process set and frontmost process.
#[derive(Debug, Default)]
pub struct ProcessWatcher {
    known: Option<HashSet<u32>>,
    active_pid: Option<u32>,
}

impl ProcessWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a fresh process snapshot and return launches and terminations
    /// since the previous one. The first snapshot only establishes a baseline.
    pub fn observe_processes(&mut self, current: HashSet<u32>) -> Vec<ProcessEvent> {
        let events = match &self.known {
            None => Vec::new(),
            Some(previous) => diff_process_sets(previous, &current),
        };
        self.known = Some(current);
        events
    }

    /// Feed the owner of the active window. Emits an activation only when
    /// the frontmost process changes.
    pub fn observe_active(&mut self, pid: Option<u32>) -> Option<ProcessEvent> {
        if pid == self.active_pid {
            return None;
        }
        self.active_pid = pid;
        pid.map(ProcessEvent::activated)
    }
}

/// Collapse the owner pid of each managed window into a set. Windows
/// without a known owner are ignored.
pub fn window_owners(owners: impl IntoIterator<Item = Option<u32>>) -> HashSet<u32> {
    owners.into_iter().flatten().collect()
}

/// Launches are reported before terminations, each in ascending pid order.
pub fn diff_process_sets(previous: &HashSet<u32>, current: &HashSet<u32>) -> Vec<ProcessEvent> {
    let mut launched: Vec<u32> = current.difference(previous).copied().collect();
    let mut terminated: Vec<u32> = previous.difference(current).copied().collect();
    launched.sort_unstable();
    terminated.sort_unstable();

    launched
        .into_iter()
        .map(ProcessEvent::launched)
        .chain(terminated.into_iter().map(ProcessEvent::terminated))
        .collect()
}
