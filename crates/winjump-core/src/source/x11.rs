//! EWMH window source.
//!
//! Windows come from the window manager's `_NET_CLIENT_LIST`, owners from
//! `_NET_WM_PID`. Process names and liveness come from sysinfo. Focus is
//! requested with `_NET_ACTIVE_WINDOW` client messages, so any EWMH
//! compliant window manager honors it.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::{Pid as SysinfoPid, ProcessesToUpdate, System};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ClientMessageEvent, ConnectionExt as _, EventMask, Window,
};
use x11rb::rust_connection::RustConnection;

use super::errors::SourceError;
use super::traits::WindowSource;
use super::types::{EventSender, NativeHandle, ProcessEntry, WindowEntry};
use super::watcher::{ProcessWatcher, window_owners};

/// Source indication 2: request comes from a pager, which window managers
/// do not subject to focus-stealing prevention.
const SOURCE_INDICATION_PAGER: u32 = 2;
const NET_WM_STATE_REMOVE: u32 = 0;
const ICONIC_STATE: u32 = 3;

#[derive(Debug)]
struct Atoms {
    net_client_list: Atom,
    net_active_window: Atom,
    net_wm_pid: Atom,
    net_wm_name: Atom,
    net_wm_state: Atom,
    net_wm_state_hidden: Atom,
    wm_change_state: Atom,
    utf8_string: Atom,
}

impl Atoms {
    fn new(conn: &RustConnection) -> Result<Self, SourceError> {
        let intern = |name: &str| -> Result<Atom, SourceError> {
            Ok(conn
                .intern_atom(false, name.as_bytes())
                .map_err(connection_failed)?
                .reply()
                .map_err(connection_failed)?
                .atom)
        };

        Ok(Self {
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_pid: intern("_NET_WM_PID")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_hidden: intern("_NET_WM_STATE_HIDDEN")?,
            wm_change_state: intern("WM_CHANGE_STATE")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }
}

struct Inner {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    system: Mutex<System>,
}

/// Window source backed by an X11 connection.
#[derive(Clone)]
pub struct X11WindowSource {
    inner: Arc<Inner>,
    poll_interval: Duration,
}

impl X11WindowSource {
    /// Connect to the display named by `$DISPLAY`.
    pub fn connect() -> Result<Self, SourceError> {
        let (conn, screen_num) = x11rb::connect(None).map_err(connection_failed)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| SourceError::ConnectionFailed {
                message: format!("screen {} not found", screen_num),
            })?;
        let atoms = Atoms::new(&conn)?;

        info!(event = "core.source.x11_connected", screen = screen_num);

        Ok(Self {
            inner: Arc::new(Inner {
                conn,
                root,
                atoms,
                system: Mutex::new(System::new()),
            }),
            poll_interval: Duration::from_millis(500),
        })
    }

    /// Interval of the event thread's process and focus polling.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Inner {
    fn client_list(&self) -> Result<Vec<Window>, SourceError> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_client_list,
                AtomEnum::WINDOW,
                0,
                u32::MAX,
            )
            .map_err(connection_failed)?
            .reply()
            .map_err(connection_failed)?;

        if reply.type_ == u32::from(AtomEnum::NONE) {
            // No EWMH window manager is running, or it withholds the list
            return Err(SourceError::PermissionDenied {
                message: "_NET_CLIENT_LIST is not available".to_string(),
            });
        }

        Ok(reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn window_pid(&self, window: Window) -> Option<u32> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.net_wm_pid,
                AtomEnum::CARDINAL,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;
        reply.value32().and_then(|mut values| values.next())
    }

    fn window_title(&self, window: Window) -> String {
        let utf8 = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.net_wm_name,
                self.atoms.utf8_string,
                0,
                u32::MAX,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| String::from_utf8_lossy(&reply.value).into_owned())
            .unwrap_or_default();

        if !utf8.is_empty() {
            return utf8;
        }

        self.conn
            .get_property(
                false,
                window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                0,
                u32::MAX,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| String::from_utf8_lossy(&reply.value).into_owned())
            .unwrap_or_default()
    }

    fn window_state(&self, window: Window) -> Result<Vec<Atom>, SourceError> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.net_wm_state,
                AtomEnum::ATOM,
                0,
                u32::MAX,
            )
            .map_err(connection_failed)?
            .reply()
            .map_err(|_| SourceError::StaleHandle {
                handle: u64::from(window),
            })?;
        Ok(reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn active_window_pid(&self) -> Option<u32> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;
        let window = reply.value32().and_then(|mut values| values.next())?;
        if window == 0 {
            return None;
        }
        self.window_pid(window)
    }

    /// Window ids are 32-bit on the wire; anything wider was never issued by X.
    fn resolve(&self, handle: NativeHandle) -> Result<Window, SourceError> {
        let window = Window::try_from(handle.as_u64()).map_err(|_| SourceError::StaleHandle {
            handle: handle.as_u64(),
        })?;
        if !self.client_list()?.contains(&window) {
            return Err(SourceError::StaleHandle {
                handle: handle.as_u64(),
            });
        }
        Ok(window)
    }

    fn send_client_message(
        &self,
        window: Window,
        message_type: Atom,
        data: [u32; 5],
    ) -> Result<(), SourceError> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )
            .map_err(action_failed)?;
        self.conn.flush().map_err(action_failed)?;
        Ok(())
    }

    fn process_is_running(&self, pid: u32) -> bool {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        let pid_obj = SysinfoPid::from_u32(pid);
        system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);
        system.process(pid_obj).is_some()
    }

    /// Pids owning at least one managed window. `None` when the client
    /// list cannot be read, so a failed poll emits nothing.
    fn window_owner_pids(&self) -> Option<HashSet<u32>> {
        let windows = self.client_list().ok()?;
        Some(window_owners(windows.into_iter().map(|w| self.window_pid(w))))
    }
}

impl WindowSource for X11WindowSource {
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, SourceError> {
        let windows = self.inner.client_list()?;

        let owners: BTreeSet<u32> = windows
            .into_iter()
            .filter_map(|window| self.inner.window_pid(window))
            .collect();

        let mut system = self.inner.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_processes(ProcessesToUpdate::All, true);

        let processes: Vec<ProcessEntry> = owners
            .into_iter()
            .filter_map(|pid| {
                system
                    .process(SysinfoPid::from_u32(pid))
                    .map(|process| ProcessEntry::new(pid, process.name().to_string_lossy()))
            })
            .collect();

        debug!(
            event = "core.source.list_processes_completed",
            count = processes.len()
        );
        Ok(processes)
    }

    fn list_windows(&self, pid: u32) -> Result<Vec<WindowEntry>, SourceError> {
        let windows: Vec<WindowEntry> = self
            .inner
            .client_list()?
            .into_iter()
            .filter(|&window| self.inner.window_pid(window) == Some(pid))
            .map(|window| {
                WindowEntry::new(
                    NativeHandle::new(u64::from(window)),
                    self.inner.window_title(window),
                )
            })
            .collect();

        if windows.is_empty() && !self.inner.process_is_running(pid) {
            return Err(SourceError::ProcessNotFound { pid });
        }

        Ok(windows)
    }

    /// X11 has no per-process activation; this only checks liveness and
    /// leaves focusing to `raise`.
    fn activate(&self, pid: u32) -> Result<(), SourceError> {
        if self.inner.process_is_running(pid) {
            Ok(())
        } else {
            Err(SourceError::ProcessNotFound { pid })
        }
    }

    fn raise(&self, handle: NativeHandle) -> Result<(), SourceError> {
        let window = self.inner.resolve(handle)?;
        self.inner.send_client_message(
            window,
            self.inner.atoms.net_active_window,
            [SOURCE_INDICATION_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
        )
    }

    fn is_minimized(&self, handle: NativeHandle) -> bool {
        let Ok(window) = Window::try_from(handle.as_u64()) else {
            return false;
        };
        match self.inner.window_state(window) {
            Ok(state) => state.contains(&self.inner.atoms.net_wm_state_hidden),
            Err(_) => false,
        }
    }

    fn set_minimized(&self, handle: NativeHandle, minimized: bool) -> Result<(), SourceError> {
        let window = self.inner.resolve(handle)?;
        if minimized {
            return self.inner.send_client_message(
                window,
                self.inner.atoms.wm_change_state,
                [ICONIC_STATE, 0, 0, 0, 0],
            );
        }

        self.inner.send_client_message(
            window,
            self.inner.atoms.net_wm_state,
            [
                NET_WM_STATE_REMOVE,
                self.inner.atoms.net_wm_state_hidden,
                0,
                SOURCE_INDICATION_PAGER,
                0,
            ],
        )?;
        self.inner
            .conn
            .map_window(window)
            .map_err(action_failed)?;
        self.inner.conn.flush().map_err(action_failed)?;
        Ok(())
    }

    fn subscribe(&self, events: EventSender) -> Result<(), SourceError> {
        let inner = Arc::clone(&self.inner);
        let poll_interval = self.poll_interval;

        std::thread::Builder::new()
            .name("winjump-x11-events".to_string())
            .spawn(move || {
                let mut watcher = ProcessWatcher::new();
                loop {
                    let mut batch = match inner.window_owner_pids() {
                        Some(owners) => watcher.observe_processes(owners),
                        None => Vec::new(),
                    };
                    batch.extend(watcher.observe_active(inner.active_window_pid()));

                    for event in batch {
                        if events.send(event).is_err() {
                            debug!(event = "core.source.event_thread_stopped");
                            return;
                        }
                    }

                    if events.is_closed() {
                        debug!(event = "core.source.event_thread_stopped");
                        return;
                    }
                    std::thread::sleep(poll_interval);
                }
            })
            .map_err(|e| SourceError::ConnectionFailed {
                message: format!("failed to spawn event thread: {}", e),
            })?;

        info!(
            event = "core.source.subscribed",
            poll_interval_ms = poll_interval.as_millis() as u64,
        );
        Ok(())
    }
}

fn connection_failed(e: impl std::fmt::Display) -> SourceError {
    SourceError::ConnectionFailed {
        message: e.to_string(),
    }
}

fn action_failed(e: impl std::fmt::Display) -> SourceError {
    warn!(event = "core.source.action_failed", error = %e);
    SourceError::ActionFailed {
        message: e.to_string(),
    }
}
