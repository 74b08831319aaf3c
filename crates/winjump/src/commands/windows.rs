use std::path::Path;

use clap::ArgMatches;
use tracing::{error, info};

use winjump_core::daemon::{self, DaemonClientError};

use crate::table::TableFormatter;

fn report_client_error(command: &str, e: &DaemonClientError) {
    match e {
        DaemonClientError::NotRunning { .. } => {
            eprintln!("winjump daemon is not running. Start it with 'winjump daemon'.");
        }
        _ => eprintln!("{} failed: {}", command, e),
    }
    error!(event = "cli.client_failed", command = command, error = %e);
}

pub(crate) fn handle_list_command(
    matches: &ArgMatches,
    socket: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if matches.get_flag("json") {
        let raw =
            daemon::list_windows_json(socket).inspect_err(|e| report_client_error("list", e))?;
        println!("{}", raw);
        return Ok(());
    }

    let windows = daemon::list_windows(socket).inspect_err(|e| report_client_error("list", e))?;
    if windows.is_empty() {
        println!("No windows tracked.");
    } else {
        TableFormatter::new(&windows).print_table(&windows);
    }
    info!(event = "cli.list_completed", count = windows.len());
    Ok(())
}

pub(crate) fn handle_focus_command(
    matches: &ArgMatches,
    socket: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let window_id = matches
        .get_one::<String>("id")
        .ok_or("Window id argument is required")?;

    let response =
        daemon::focus_window(socket, window_id).inspect_err(|e| report_client_error("focus", e))?;

    if response.success {
        println!("{}", response.message_or_default());
        Ok(())
    } else {
        eprintln!("{}", response.message_or_default());
        Err(response.message_or_default().to_string().into())
    }
}

pub(crate) fn handle_refresh_command(socket: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let response =
        daemon::request_refresh(socket).inspect_err(|e| report_client_error("refresh", e))?;
    println!("Daemon is {}.", response.message_or_default());
    Ok(())
}

pub(crate) fn handle_stop_command(socket: &Path) -> Result<(), Box<dyn std::error::Error>> {
    daemon::request_shutdown(socket).inspect_err(|e| report_client_error("stop", e))?;
    println!("Daemon stopped.");
    Ok(())
}
