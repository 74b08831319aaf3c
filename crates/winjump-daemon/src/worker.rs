use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use winjump_core::source::WindowSource;

use crate::errors::DaemonError;
use crate::focus::{FocusController, FocusOutcome};
use crate::registry::{WindowDescriptor, WindowRegistry};
use crate::scanner::{ScanPolicy, Scanner};
use crate::types::DaemonConfig;

/// Operations on the registry. Every read and write goes through one of these.
#[derive(Debug)]
pub enum RegistryCommand {
    List {
        reply: oneshot::Sender<Vec<WindowDescriptor>>,
    },
    Focus {
        window_id: String,
        reply: oneshot::Sender<FocusOutcome>,
    },
    FullScan,
    RescanProcess {
        pid: u32,
    },
    ProcessActivated {
        pid: u32,
    },
    ProcessTerminated {
        pid: u32,
    },
}

/// Owns the registry and everything allowed to touch it.
///
/// Commands are applied one at a time, so a focus flow with its rescan and
/// retry never interleaves with an event reaction or a scan.
pub struct WindowManager {
    registry: WindowRegistry,
    scanner: Scanner,
    focus: FocusController,
    source: Arc<dyn WindowSource>,
    rescan_on_activate: bool,
}

impl WindowManager {
    pub fn new(source: Arc<dyn WindowSource>, config: &DaemonConfig) -> Self {
        Self {
            registry: WindowRegistry::new(),
            scanner: Scanner::new(ScanPolicy::from_config(&config.scan)),
            focus: FocusController::new(config.settle_delay()),
            source,
            rescan_on_activate: config.scan.rescan_on_activate,
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn handle(&mut self, command: RegistryCommand) {
        match command {
            RegistryCommand::List { reply } => {
                let _ = reply.send(self.registry.snapshot_sorted_by_recency());
            }
            RegistryCommand::Focus { window_id, reply } => {
                let outcome = self.focus.focus(
                    &window_id,
                    self.source.as_ref(),
                    &mut self.registry,
                    &mut self.scanner,
                );
                info!(
                    event = "daemon.focus.completed",
                    window_id = window_id.as_str(),
                    success = outcome.is_success(),
                );
                let _ = reply.send(outcome);
            }
            RegistryCommand::FullScan => {
                self.scanner
                    .full_scan(self.source.as_ref(), &mut self.registry);
            }
            RegistryCommand::RescanProcess { pid } => {
                self.scanner
                    .scan_process(pid, self.source.as_ref(), &mut self.registry);
            }
            RegistryCommand::ProcessActivated { pid } => {
                let touched = self.registry.touch_pid(pid);
                debug!(event = "daemon.events.activated", pid = pid, touched = touched);
                if self.rescan_on_activate {
                    self.scanner
                        .scan_process(pid, self.source.as_ref(), &mut self.registry);
                }
            }
            RegistryCommand::ProcessTerminated { pid } => {
                let removed = self.registry.remove_pid(pid);
                debug!(event = "daemon.events.terminated", pid = pid, removed = removed);
            }
        }
    }
}

/// Cloneable sender side of the registry worker.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    tx: mpsc::UnboundedSender<RegistryCommand>,
}

impl RegistryHandle {
    pub fn send(&self, command: RegistryCommand) -> Result<(), DaemonError> {
        self.tx
            .send(command)
            .map_err(|_| DaemonError::WorkerUnavailable)
    }

    /// Snapshot of all windows, most recently used first.
    pub async fn list(&self) -> Result<Vec<WindowDescriptor>, DaemonError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::List { reply })?;
        rx.await.map_err(|_| DaemonError::WorkerUnavailable)
    }

    pub async fn focus(&self, window_id: impl Into<String>) -> Result<FocusOutcome, DaemonError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::Focus {
            window_id: window_id.into(),
            reply,
        })?;
        rx.await.map_err(|_| DaemonError::WorkerUnavailable)
    }

    /// Queue a full scan without waiting for it.
    pub fn request_full_scan(&self) -> Result<(), DaemonError> {
        self.send(RegistryCommand::FullScan)
    }
}

/// Start the registry worker on a blocking thread.
///
/// The worker stops once every `RegistryHandle` has been dropped.
pub fn spawn_worker(mut manager: WindowManager) -> (RegistryHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || {
        info!(event = "daemon.worker.started");
        while let Some(command) = rx.blocking_recv() {
            manager.handle(command);
        }
        info!(
            event = "daemon.worker.stopped",
            windows = manager.registry().len(),
        );
    });
    (RegistryHandle { tx }, worker)
}
