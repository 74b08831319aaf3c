pub mod connection;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use winjump_core::source::WindowSource;

use crate::errors::DaemonError;
use crate::events::{run_event_bridge, run_periodic_scan};
use crate::pid_file::{read_pid_file, remove_pid_file, write_pid_file};
use crate::types::DaemonConfig;
use crate::worker::{WindowManager, spawn_worker};

/// Run the daemon until `quit`, SIGINT or SIGTERM.
pub async fn run_server(
    config: DaemonConfig,
    source: Arc<dyn WindowSource>,
) -> Result<(), DaemonError> {
    run_server_until(config, source, CancellationToken::new()).await
}

/// Run the daemon until `shutdown` is cancelled, by a caller, a `quit`
/// request or a signal.
pub async fn run_server_until(
    config: DaemonConfig,
    source: Arc<dyn WindowSource>,
    shutdown: CancellationToken,
) -> Result<(), DaemonError> {
    info!(
        event = "daemon.server.start_started",
        socket_path = %config.socket_path.display(),
    );

    let listener = bind_socket(&config.socket_path).await?;
    if let Some(previous) = read_pid_file(&config.pid_path) {
        info!(event = "daemon.server.stale_pid_file", pid = previous);
    }
    if let Err(e) = write_pid_file(&config.pid_path) {
        let _ = std::fs::remove_file(&config.socket_path);
        return Err(e);
    }

    let (registry, worker) = spawn_worker(WindowManager::new(source.clone(), &config));
    if let Err(e) = registry.request_full_scan() {
        warn!(event = "daemon.server.startup_scan_failed", error = %e);
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    if let Err(e) = source.subscribe(events_tx) {
        warn!(
            event = "daemon.server.subscribe_failed",
            error = %e,
            "Continuing with periodic scans only",
        );
    }

    let bridge = tokio::spawn(run_event_bridge(
        events_rx,
        registry.clone(),
        config.launch_delay(),
        shutdown.clone(),
    ));
    let periodic = config.scan_interval().map(|interval| {
        tokio::spawn(run_periodic_scan(
            registry.clone(),
            interval,
            shutdown.clone(),
        ))
    });
    let signals = tokio::spawn(watch_signals(shutdown.clone()));

    info!(
        event = "daemon.server.start_completed",
        socket_path = %config.socket_path.display(),
        pid = std::process::id(),
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    connection::handle_connection(
                        stream,
                        &registry,
                        &shutdown,
                        config.request_timeout(),
                    )
                    .await;
                }
                Err(e) => {
                    error!(event = "daemon.server.accept_failed", error = %e);
                }
            },
        }
    }

    info!(event = "daemon.server.shutdown_started");

    drop(listener);
    if let Err(e) = std::fs::remove_file(&config.socket_path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(
            event = "daemon.server.socket_cleanup_failed",
            path = %config.socket_path.display(),
            error = %e,
        );
    }
    remove_pid_file(&config.pid_path);

    signals.abort();
    let _ = bridge.await;
    if let Some(periodic) = periodic {
        let _ = periodic.await;
    }

    drop(registry);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, worker).await.is_err() {
        warn!(
            event = "daemon.server.worker_drain_timeout",
            timeout_secs = config.shutdown_timeout_secs,
        );
    }

    info!(event = "daemon.server.shutdown_completed");
    Ok(())
}

/// Bind the socket, replacing a stale file left by a crashed daemon.
async fn bind_socket(path: &Path) -> Result<UnixListener, DaemonError> {
    let bind_error = |e: std::io::Error| DaemonError::BindFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(bind_error)?;
    }

    if path.exists() {
        if UnixStream::connect(path).await.is_ok() {
            return Err(DaemonError::AlreadyRunning {
                path: path.display().to_string(),
            });
        }
        info!(event = "daemon.server.stale_socket_removed", path = %path.display());
        std::fs::remove_file(path).map_err(bind_error)?;
    }

    UnixListener::bind(path).map_err(bind_error)
}

async fn watch_signals(shutdown: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(event = "daemon.server.signal_install_failed", error = %e);
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!(event = "daemon.server.signal_received", signal = "SIGINT");
        }
        _ = sigterm.recv() => {
            info!(event = "daemon.server.signal_received", signal = "SIGTERM");
        }
    }
    shutdown.cancel();
}
