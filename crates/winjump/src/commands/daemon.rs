use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, info};

use winjump_core::config::WinjumpConfig;
use winjump_core::source::X11WindowSource;
use winjump_daemon::DaemonConfig;

pub(crate) fn handle_daemon_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.daemon_started");

    // A daemon must not run on a config the user did not write.
    let mut config = WinjumpConfig::load_hierarchy().map_err(|e| {
        error!(event = "cli.daemon_failed", stage = "config", error = %e);
        e
    })?;
    super::apply_socket_override(&mut config, matches);

    let source = X11WindowSource::connect().map_err(|e| {
        eprintln!("Could not connect to the X server: {}", e);
        error!(event = "cli.daemon_failed", stage = "window_source", error = %e);
        e
    })?;

    let daemon_config = DaemonConfig::from_config(&config);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime
        .block_on(winjump_daemon::run_server(daemon_config, Arc::new(source)))
        .map_err(|e| {
            eprintln!("Daemon failed: {}", e);
            error!(event = "cli.daemon_failed", stage = "server", error = %e);
            e
        })?;

    info!(event = "cli.daemon_completed");
    Ok(())
}
