use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use winjump_core::source::{ProcessEvent, ProcessEventKind};

use crate::worker::{RegistryCommand, RegistryHandle};

/// Forward process lifecycle notifications into the registry worker.
///
/// Launches are rescanned after `launch_delay`, since a new process usually
/// has no windows yet. Pending delayed rescans are dropped on shutdown.
pub async fn run_event_bridge(
    mut events: mpsc::UnboundedReceiver<ProcessEvent>,
    registry: RegistryHandle,
    launch_delay: Duration,
    shutdown: CancellationToken,
) {
    let mut pending: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = pending.join_next(), if !pending.is_empty() => {}
            event = events.recv() => {
                let Some(event) = event else {
                    debug!(event = "daemon.events.stream_closed");
                    break;
                };
                debug!(
                    event = "daemon.events.received",
                    kind = ?event.kind,
                    pid = event.pid,
                );
                let forwarded = match event.kind {
                    ProcessEventKind::Activated => {
                        registry.send(RegistryCommand::ProcessActivated { pid: event.pid })
                    }
                    ProcessEventKind::Terminated => {
                        registry.send(RegistryCommand::ProcessTerminated { pid: event.pid })
                    }
                    ProcessEventKind::Launched => {
                        pending.spawn(delayed_rescan(
                            event.pid,
                            registry.clone(),
                            launch_delay,
                            shutdown.clone(),
                        ));
                        Ok(())
                    }
                };
                if let Err(e) = forwarded {
                    warn!(event = "daemon.events.forward_failed", error = %e);
                    break;
                }
            }
        }
    }

    let cancelled = pending.len();
    pending.shutdown().await;
    info!(event = "daemon.events.stopped", pending_cancelled = cancelled);
}

async fn delayed_rescan(
    pid: u32,
    registry: RegistryHandle,
    delay: Duration,
    shutdown: CancellationToken,
) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            let _ = registry.send(RegistryCommand::RescanProcess { pid });
        }
    }
}

/// Queue a full scan every `interval` until shutdown.
///
/// Backstop for notifications the window source missed.
pub async fn run_periodic_scan(
    registry: RegistryHandle,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; startup already ran a full scan.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                debug!(event = "daemon.scan.periodic_tick");
                if registry.request_full_scan().is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::FakeSource;
    use crate::types::DaemonConfig;
    use crate::worker::{WindowManager, spawn_worker};
    use winjump_core::source::WindowSource;

    fn start() -> (Arc<FakeSource>, RegistryHandle, tokio::task::JoinHandle<()>) {
        let source = Arc::new(FakeSource::new());
        source.add_process(5, "Editor");
        source.add_window(5, 100, "file.txt");
        source.add_process(6, "Terminal");
        source.add_window(6, 200, "zsh");

        let mut config = DaemonConfig::default();
        config.focus.settle_delay_ms = 0;
        let (handle, worker) = spawn_worker(WindowManager::new(source.clone(), &config));
        (source, handle, worker)
    }

    async fn pids(handle: &RegistryHandle) -> Vec<u32> {
        handle.list().await.unwrap().iter().map(|d| d.pid).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_termination_event_evicts_process() {
        let (source, handle, worker) = start();
        handle.request_full_scan().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        source.subscribe(tx).unwrap();
        let shutdown = CancellationToken::new();
        let bridge = tokio::spawn(run_event_bridge(
            rx,
            handle.clone(),
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        source.kill(5);
        assert!(source.emit(ProcessEvent::terminated(5)));

        let mut remaining = pids(&handle).await;
        for _ in 0..50 {
            if remaining == vec![6] {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            remaining = pids(&handle).await;
        }
        assert_eq!(remaining, vec![6]);

        shutdown.cancel();
        bridge.await.unwrap();
        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_launch_event_rescans_after_delay() {
        let (source, handle, worker) = start();
        handle.request_full_scan().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let bridge = tokio::spawn(run_event_bridge(
            rx,
            handle.clone(),
            Duration::from_millis(20),
            shutdown.clone(),
        ));

        source.add_process(7, "Browser");
        source.add_window(7, 300, "Start page");
        tx.send(ProcessEvent::launched(7)).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(pids(&handle).await.contains(&7));

        shutdown.cancel();
        bridge.await.unwrap();
        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_cancels_pending_launch_rescan() {
        let (source, handle, worker) = start();
        handle.request_full_scan().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let bridge = tokio::spawn(run_event_bridge(
            rx,
            handle.clone(),
            Duration::from_millis(300),
            shutdown.clone(),
        ));

        source.add_process(7, "Browser");
        source.add_window(7, 300, "Start page");
        tx.send(ProcessEvent::launched(7)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        shutdown.cancel();
        bridge.await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!pids(&handle).await.contains(&7));

        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_periodic_scan_picks_up_changes() {
        let (source, handle, worker) = start();
        handle.request_full_scan().unwrap();
        let shutdown = CancellationToken::new();
        let timer = tokio::spawn(run_periodic_scan(
            handle.clone(),
            Duration::from_millis(30),
            shutdown.clone(),
        ));

        source.kill(6);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(pids(&handle).await, vec![5]);

        shutdown.cancel();
        timer.await.unwrap();
        drop(handle);
        worker.await.unwrap();
    }
}
