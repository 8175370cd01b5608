//! keyhold CLI: a line-oriented host for the keyhold command surface.
//!
//! Modes:
//! - **Shell mode**: `keyhold -c "lmdb version"`: one command line, exit
//! - **Script mode**: `keyhold setup.kh`: run a file line by line
//! - **REPL mode**: `keyhold`: interactive prompt (if stdin is TTY)
//! - **Pipe mode**: `echo "lmdb env" | keyhold`: line-by-line from stdin

mod commands;
mod format;
mod parse;
mod repl;
mod state;

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use keyhold_executor::{KeyholdConfig, CONFIG_FILE_NAME};
use tracing::level_filters::LevelFilter;

use commands::build_cli;
use format::{format_error, OutputMode};
use state::SessionState;

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    // Handle `--init` before loading anything.
    if matches.get_flag("init") {
        match KeyholdConfig::write_default_if_missing(&config_path) {
            Ok(()) => {
                eprintln!("Config ready at {}", config_path.display());
                return;
            }
            Err(e) => {
                eprintln!("(error) {}", e);
                process::exit(1);
            }
        }
    }

    // Determine output mode
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let explicit = matches.contains_id("config");
    let config = match load_config(&config_path, explicit) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    let mut state = SessionState::new(config);
    let keep_going = matches.get_flag("keep-going");

    // Dispatch mode
    if let Some(line) = matches.get_one::<String>("command") {
        let ok = repl::execute_line(&mut state, line, output_mode);
        process::exit(if ok { 0 } else { 1 });
    } else if let Some(script) = matches.get_one::<String>("script") {
        let file = match File::open(script) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("(error) cannot open {}: {}", script, e);
                process::exit(1);
            }
        };
        let exit_code = repl::run_lines(&mut state, BufReader::new(file), output_mode, keep_going);
        process::exit(exit_code);
    } else if io::stdin().is_terminal() {
        repl::run_repl(&mut state, output_mode);
    } else {
        let exit_code = repl::run_lines(&mut state, io::stdin().lock(), output_mode, keep_going);
        process::exit(exit_code);
    }
}

/// Load the config file. A missing default file means defaults; a missing
/// file named with `--config` is an error.
fn load_config(path: &Path, explicit: bool) -> keyhold_executor::Result<KeyholdConfig> {
    if !explicit && !path.exists() {
        return Ok(KeyholdConfig::default());
    }
    KeyholdConfig::from_file(path)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}
