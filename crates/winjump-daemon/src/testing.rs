//! Scriptable in-memory window source for unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use winjump_core::source::{
    EventSender, NativeHandle, ProcessEntry, ProcessEvent, SourceError, WindowEntry, WindowSource,
};

#[derive(Default)]
struct FakeProcess {
    app_name: String,
    windows: Vec<WindowEntry>,
    not_ready: bool,
}

#[derive(Default)]
struct FakeState {
    processes: BTreeMap<u32, FakeProcess>,
    minimized: HashSet<u64>,
    failing_raises: HashSet<u64>,
    failing_activations: HashSet<u32>,
    permission_denied: bool,
    raise_calls: Vec<u64>,
    unminimize_calls: Vec<u64>,
    activate_calls: Vec<u32>,
    subscriber: Option<EventSender>,
}

#[derive(Default)]
pub(crate) struct FakeSource {
    state: Mutex<FakeState>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub(crate) fn add_process(&self, pid: u32, app_name: &str) {
        self.with_state(|s| {
            s.processes.entry(pid).or_default().app_name = app_name.to_string();
        });
    }

    pub(crate) fn add_window(&self, pid: u32, handle: u64, title: &str) {
        self.with_state(|s| {
            s.processes
                .entry(pid)
                .or_default()
                .windows
                .push(WindowEntry::new(NativeHandle::new(handle), title));
        });
    }

    pub(crate) fn remove_window(&self, pid: u32, handle: u64) {
        self.with_state(|s| {
            if let Some(process) = s.processes.get_mut(&pid) {
                process.windows.retain(|w| w.handle.as_u64() != handle);
            }
        });
    }

    /// Reissue a window under a new handle, invalidating the old one.
    pub(crate) fn replace_handle(&self, pid: u32, old: u64, new: u64) {
        self.with_state(|s| {
            if let Some(process) = s.processes.get_mut(&pid) {
                for window in &mut process.windows {
                    if window.handle.as_u64() == old {
                        window.handle = NativeHandle::new(new);
                    }
                }
            }
        });
    }

    pub(crate) fn retitle(&self, pid: u32, handle: u64, title: &str) {
        self.with_state(|s| {
            if let Some(process) = s.processes.get_mut(&pid) {
                for window in &mut process.windows {
                    if window.handle.as_u64() == handle {
                        window.title = title.to_string();
                    }
                }
            }
        });
    }

    pub(crate) fn kill(&self, pid: u32) {
        self.with_state(|s| {
            s.processes.remove(&pid);
        });
    }

    pub(crate) fn set_not_ready(&self, pid: u32, not_ready: bool) {
        self.with_state(|s| {
            if let Some(process) = s.processes.get_mut(&pid) {
                process.not_ready = not_ready;
            }
        });
    }

    pub(crate) fn set_permission_denied(&self, denied: bool) {
        self.with_state(|s| s.permission_denied = denied);
    }

    pub(crate) fn set_minimized_flag(&self, handle: u64) {
        self.with_state(|s| {
            s.minimized.insert(handle);
        });
    }

    /// Make raising this handle fail even though the window is listed.
    pub(crate) fn fail_raise(&self, handle: u64) {
        self.with_state(|s| {
            s.failing_raises.insert(handle);
        });
    }

    /// Make activating this pid fail while the process stays alive.
    pub(crate) fn fail_activate(&self, pid: u32) {
        self.with_state(|s| {
            s.failing_activations.insert(pid);
        });
    }

    pub(crate) fn raise_calls(&self) -> Vec<u64> {
        self.with_state(|s| s.raise_calls.clone())
    }

    pub(crate) fn unminimize_calls(&self) -> Vec<u64> {
        self.with_state(|s| s.unminimize_calls.clone())
    }

    pub(crate) fn activate_calls(&self) -> Vec<u32> {
        self.with_state(|s| s.activate_calls.clone())
    }

    pub(crate) fn emit(&self, event: ProcessEvent) -> bool {
        self.with_state(|s| match &s.subscriber {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        })
    }

    fn handle_is_live(state: &FakeState, handle: NativeHandle) -> bool {
        state
            .processes
            .values()
            .any(|p| p.windows.iter().any(|w| w.handle == handle))
    }
}

impl WindowSource for FakeSource {
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, SourceError> {
        self.with_state(|s| {
            if s.permission_denied {
                return Err(SourceError::PermissionDenied {
                    message: "fake".to_string(),
                });
            }
            Ok(s.processes
                .iter()
                .map(|(pid, p)| ProcessEntry::new(*pid, p.app_name.clone()))
                .collect())
        })
    }

    fn list_windows(&self, pid: u32) -> Result<Vec<WindowEntry>, SourceError> {
        self.with_state(|s| {
            if s.permission_denied {
                return Err(SourceError::PermissionDenied {
                    message: "fake".to_string(),
                });
            }
            match s.processes.get(&pid) {
                None => Err(SourceError::ProcessNotFound { pid }),
                Some(p) if p.not_ready => Err(SourceError::NotReady { pid }),
                Some(p) => Ok(p.windows.clone()),
            }
        })
    }

    fn activate(&self, pid: u32) -> Result<(), SourceError> {
        self.with_state(|s| {
            s.activate_calls.push(pid);
            if !s.processes.contains_key(&pid) {
                return Err(SourceError::ProcessNotFound { pid });
            }
            if s.failing_activations.contains(&pid) {
                return Err(SourceError::ActionFailed {
                    message: "activation refused".to_string(),
                });
            }
            Ok(())
        })
    }

    fn raise(&self, handle: NativeHandle) -> Result<(), SourceError> {
        self.with_state(|s| {
            s.raise_calls.push(handle.as_u64());
            if !Self::handle_is_live(s, handle) {
                return Err(SourceError::StaleHandle {
                    handle: handle.as_u64(),
                });
            }
            if s.failing_raises.contains(&handle.as_u64()) {
                return Err(SourceError::ActionFailed {
                    message: "raise refused".to_string(),
                });
            }
            Ok(())
        })
    }

    fn is_minimized(&self, handle: NativeHandle) -> bool {
        self.with_state(|s| s.minimized.contains(&handle.as_u64()))
    }

    fn set_minimized(&self, handle: NativeHandle, minimized: bool) -> Result<(), SourceError> {
        self.with_state(|s| {
            if minimized {
                s.minimized.insert(handle.as_u64());
            } else {
                s.minimized.remove(&handle.as_u64());
                s.unminimize_calls.push(handle.as_u64());
            }
            Ok(())
        })
    }

    fn subscribe(&self, events: EventSender) -> Result<(), SourceError> {
        self.with_state(|s| s.subscriber = Some(events));
        Ok(())
    }
}
