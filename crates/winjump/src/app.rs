use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("winjump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Jump to any open window by id")
        .long_about("winjump runs a small daemon that keeps track of every open application window, most recently used first. Front-ends list the windows and ask the daemon to focus one.")
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("socket")
                .long("socket")
                .short('s')
                .help("Daemon socket path (overrides config)")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("daemon")
                .about("Run the window daemon in the foreground")
        )
        .subcommand(
            Command::new("list")
                .about("List open windows, most recently used first")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the daemon's JSON response as-is")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("focus")
                .about("Focus a window by id")
                .arg(
                    Arg::new("id")
                        .help("Window id as shown by 'winjump list'")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("refresh")
                .about("Ask the daemon to rescan all windows")
        )
        .subcommand(
            Command::new("stop")
                .about("Stop the running daemon")
        )
}
