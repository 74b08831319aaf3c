use std::time::Duration;

use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::protocol::codec::{read_request, write_response};
use crate::protocol::{Request, Response, parse_request};
use crate::worker::RegistryHandle;

/// Serve one connection: read a line, answer it, close.
///
/// A client that sends nothing within `request_timeout` is dropped without
/// a response so it cannot hold up the accept loop.
pub async fn handle_connection(
    stream: UnixStream,
    registry: &RegistryHandle,
    shutdown: &CancellationToken,
    request_timeout: Duration,
) {
    let (reader, mut writer) = stream.into_split();

    let line = match tokio::time::timeout(request_timeout, read_request(reader)).await {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => {
            warn!(event = "daemon.connection.read_error", error = %e);
            return;
        }
        Err(_) => {
            warn!(
                event = "daemon.connection.read_timeout",
                timeout_ms = request_timeout.as_millis() as u64,
            );
            return;
        }
    };

    let response = dispatch_request(line.trim(), registry, shutdown).await;

    if let Err(e) = write_response(&mut writer, &response).await {
        debug!(event = "daemon.connection.write_failed", error = %e);
    }
}

/// Turn one request line into a response. Failures are reported in-band.
pub async fn dispatch_request(
    line: &str,
    registry: &RegistryHandle,
    shutdown: &CancellationToken,
) -> Response {
    let request = match parse_request(line) {
        Ok(request) => request,
        Err(e) => {
            debug!(event = "daemon.connection.bad_request", line = line, error = %e);
            return Response::failure(e.to_string());
        }
    };

    debug!(event = "daemon.connection.request", request = ?request);

    match request {
        Request::List | Request::ListJson => match registry.list().await {
            Ok(windows) => Response::windows(windows.iter().map(|d| d.to_summary()).collect()),
            Err(e) => Response::failure(e.to_string()),
        },
        Request::Focus { window_id } => match registry.focus(window_id).await {
            Ok(outcome) => Response {
                success: outcome.is_success(),
                message: Some(outcome.message()),
                windows: None,
            },
            Err(e) => Response::failure(e.to_string()),
        },
        Request::Refresh => match registry.request_full_scan() {
            Ok(()) => Response::ok("refreshing"),
            Err(e) => Response::failure(e.to_string()),
        },
        Request::Quit => {
            info!(event = "daemon.server.quit_requested");
            shutdown.cancel();
            Response::ok("Shutting down daemon")
        }
    }
}
