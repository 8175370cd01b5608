//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the `keyhold` command line.
pub fn build_cli() -> Command {
    Command::new("keyhold")
        .about("Line-oriented shell for LMDB environments, transactions, databases and cursors")
        .arg(
            Arg::new("command")
                .short('c')
                .long("command")
                .help("Run one command line and exit")
                .conflicts_with("script"),
        )
        .arg(
            Arg::new("script")
                .help("Script file to run line by line")
                .index(1),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Continue a script or pipe after a failing line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw"),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (host value text, no type prefixes)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to keyhold.toml (default: ./keyhold.toml if present)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .help("Write a default config file (at --config or ./keyhold.toml) unless one exists, then exit")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["command", "script"]),
        )
}
