use std::path::PathBuf;

use clap::ArgMatches;
use tracing::{error, warn};

use winjump_core::config::WinjumpConfig;

mod daemon;
mod windows;

/// Load configuration with warning on errors.
///
/// Client commands fall back to defaults so a broken config file never
/// stops the user from reaching a running daemon.
fn load_config_with_warning() -> WinjumpConfig {
    match WinjumpConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.winjump/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            WinjumpConfig::default()
        }
    }
}

/// Apply the `--socket` override on top of the loaded config.
fn apply_socket_override(config: &mut WinjumpConfig, matches: &ArgMatches) {
    if let Some(socket) = matches.get_one::<PathBuf>("socket") {
        config.daemon.socket_path = Some(socket.clone());
    }
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("daemon", sub_matches)) => daemon::handle_daemon_command(sub_matches),
        Some((name, sub_matches)) => {
            let mut config = load_config_with_warning();
            apply_socket_override(&mut config, sub_matches);
            let socket = config.socket_path();
            match name {
                "list" => windows::handle_list_command(sub_matches, &socket),
                "focus" => windows::handle_focus_command(sub_matches, &socket),
                "refresh" => windows::handle_refresh_command(&socket),
                "stop" => windows::handle_stop_command(&socket),
                _ => {
                    error!(event = "cli.command_unknown", command = name);
                    Err("Unknown command".into())
                }
            }
        }
        None => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
