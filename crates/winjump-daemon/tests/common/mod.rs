//! Shared helpers for daemon integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use winjump_core::daemon::Response;
use winjump_core::source::{
    EventSender, NativeHandle, ProcessEntry, ProcessEvent, SourceError, WindowEntry, WindowSource,
};
use winjump_daemon::DaemonConfig;

/// Daemon config rooted in a temp directory, with timers tuned for tests.
pub fn test_config(dir: &Path) -> DaemonConfig {
    let mut config = DaemonConfig::default();
    config.socket_path = dir.join("daemon.sock");
    config.pid_path = dir.join("daemon.pid");
    config.request_timeout_ms = 500;
    config.shutdown_timeout_secs = 2;
    config.scan.interval_secs = 0;
    config.scan.launch_delay_ms = 20;
    config.focus.settle_delay_ms = 0;
    config
}

/// Send one request line and decode the single response line.
pub async fn send(socket: &Path, line: &str) -> Response {
    let raw = send_raw(socket, line).await;
    serde_json::from_str(raw.trim_end()).unwrap()
}

pub async fn send_raw(socket: &Path, line: &str) -> String {
    let mut stream = UnixStream::connect(socket).await.unwrap();
    stream.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

/// Poll until `socket` accepts connections.
pub async fn wait_for_socket(socket: &PathBuf) {
    for _ in 0..100 {
        if UnixStream::connect(socket).await.is_ok() {
            // Give the startup scan a moment to land.
            tokio::time::sleep(Duration::from_millis(50)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("daemon did not start listening on {}", socket.display());
}

#[derive(Default)]
struct State {
    processes: BTreeMap<u32, (String, Vec<WindowEntry>)>,
    subscriber: Option<EventSender>,
    raises: Vec<u64>,
}

/// In-memory window source driven by the test.
#[derive(Default)]
pub struct FakeSource {
    state: Mutex<State>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, pid: u32, app_name: &str, handle: u64, title: &str) {
        let mut state = self.state.lock().unwrap();
        let process = state
            .processes
            .entry(pid)
            .or_insert_with(|| (app_name.to_string(), Vec::new()));
        process
            .1
            .push(WindowEntry::new(NativeHandle::new(handle), title));
    }

    pub fn replace_handle(&self, pid: u32, old: u64, new: u64) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, windows)) = state.processes.get_mut(&pid) {
            for window in windows.iter_mut().filter(|w| w.handle.as_u64() == old) {
                window.handle = NativeHandle::new(new);
            }
        }
    }

    pub fn kill(&self, pid: u32) {
        self.state.lock().unwrap().processes.remove(&pid);
    }

    pub fn emit(&self, event: ProcessEvent) {
        let state = self.state.lock().unwrap();
        let subscriber = state.subscriber.as_ref().expect("daemon subscribed");
        subscriber.send(event).unwrap();
    }

    pub fn raises(&self) -> Vec<u64> {
        self.state.lock().unwrap().raises.clone()
    }
}

impl WindowSource for FakeSource {
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, SourceError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .processes
            .iter()
            .map(|(pid, (name, _))| ProcessEntry::new(*pid, name.clone()))
            .collect())
    }

    fn list_windows(&self, pid: u32) -> Result<Vec<WindowEntry>, SourceError> {
        let state = self.state.lock().unwrap();
        state
            .processes
            .get(&pid)
            .map(|(_, windows)| windows.clone())
            .ok_or(SourceError::ProcessNotFound { pid })
    }

    fn activate(&self, pid: u32) -> Result<(), SourceError> {
        let state = self.state.lock().unwrap();
        if state.processes.contains_key(&pid) {
            Ok(())
        } else {
            Err(SourceError::ProcessNotFound { pid })
        }
    }

    fn raise(&self, handle: NativeHandle) -> Result<(), SourceError> {
        let mut state = self.state.lock().unwrap();
        state.raises.push(handle.as_u64());
        let live = state
            .processes
            .values()
            .any(|(_, windows)| windows.iter().any(|w| w.handle == handle));
        if live {
            Ok(())
        } else {
            Err(SourceError::StaleHandle {
                handle: handle.as_u64(),
            })
        }
    }

    fn is_minimized(&self, _handle: NativeHandle) -> bool {
        false
    }

    fn set_minimized(&self, _handle: NativeHandle, _minimized: bool) -> Result<(), SourceError> {
        Ok(())
    }

    fn subscribe(&self, events: EventSender) -> Result<(), SourceError> {
        self.state.lock().unwrap().subscriber = Some(events);
        Ok(())
    }
}
