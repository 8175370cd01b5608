//! REPL loop with rustyline, plus the line runner shared by pipe and
//! script modes.

use std::io::BufRead;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use keyhold_executor::{subcommands, HandleKind, ROOT_WORD};

use crate::format::{format_error, format_output, format_parse_error, OutputMode};
use crate::parse::{check_meta_command, is_blank, MetaCommand};
use crate::state::{LineError, SessionState};

/// Run one line and print its result. Returns true on success.
pub fn execute_line(state: &mut SessionState, line: &str, mode: OutputMode) -> bool {
    match state.run_line(line) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            true
        }
        Err(LineError::Command(e)) => {
            eprintln!("{}", format_error(&e, mode));
            false
        }
        Err(LineError::Parse(msg)) => {
            eprintln!("{}", format_parse_error(&msg, mode));
            false
        }
    }
}

/// Run lines from `input` (a pipe or a script file).
///
/// Stops at the first failing line unless `keep_going` is set. Returns the
/// process exit code.
pub fn run_lines<R: BufRead>(
    state: &mut SessionState,
    input: R,
    mode: OutputMode,
    keep_going: bool,
) -> i32 {
    let mut exit_code = 0;

    for (number, line) in input.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("(error) read failed: {}", e);
                return 1;
            }
        };
        if is_blank(&line) {
            continue;
        }
        if !execute_line(state, line.trim(), mode) {
            exit_code = 1;
            if !keep_going {
                tracing::debug!(target: "keyhold::cli", line = number + 1, "stopping at failed line");
                break;
            }
        }
    }

    exit_code
}

/// Run the interactive REPL.
pub fn run_repl(state: &mut SessionState, mode: OutputMode) {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<KeyholdHelper, _> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("(error) cannot start line editor: {}", e);
            return;
        }
    };
    rl.set_helper(Some(KeyholdHelper::default()));

    // Load history
    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        if let Some(helper) = rl.helper_mut() {
            helper.handles = state.handles();
        }
        let prompt = state.prompt();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if is_blank(trimmed) {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                // Check meta-commands first
                if let Some(meta) = check_meta_command(trimmed) {
                    match meta {
                        MetaCommand::Quit => break,
                        MetaCommand::Clear => {
                            // ANSI clear screen
                            print!("\x1B[2J\x1B[1;1H");
                        }
                        MetaCommand::Help { command } => print_help(command.as_deref()),
                        MetaCommand::Handles => print_handles(state),
                    }
                    continue;
                }

                execute_line(state, trimmed, mode);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: fresh prompt
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                break;
            }
            Err(err) => {
                eprintln!("(error) {:?}", err);
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
}

fn history_file() -> Option<String> {
    std::env::var("HOME")
        .ok()
        .map(|h| format!("{}/.keyhold_history", h))
}

fn print_handles(state: &SessionState) {
    let handles = state.handles();
    if handles.is_empty() {
        println!("(no open handles)");
    }
    for (token, kind) in handles {
        println!("{:<16} {}", token, kind.name());
    }
}

fn print_help(command: Option<&str>) {
    let kind = match command {
        Some(ROOT_WORD) => Some(None),
        Some(name) => HandleKind::ALL
            .iter()
            .find(|k| k.name() == name)
            .map(|k| Some(*k)),
        None => None,
    };
    match kind {
        Some(kind) => {
            let label = kind.map_or(ROOT_WORD, HandleKind::name);
            println!("{} subcommands: {}", label, subcommands(kind).join(", "));
        }
        None => {
            println!("Commands:");
            println!("  lmdb env                         Create an environment (env0, env1, ...)");
            println!("  lmdb open -env E ?-name N? ...   Open a database (dbi0, ...)");
            println!("  lmdb version ?-string?           Engine version");
            println!("  <token> <subcommand> args...     Call a handle; see `help env|txn|dbi|cursor`");
            println!();
            println!("  $_ stands for the previous result, e.g. `lmdb env` then `$_ open -path ./db`");
            println!();
            println!("Meta-commands:");
            println!("  help [lmdb|env|txn|dbi|cursor]   Show help");
            println!("  handles                          List open handles");
            println!("  quit / exit                      Exit REPL");
            println!("  clear                            Clear screen");
        }
    }
}

// =========================================================================
// TAB Completion
// =========================================================================

const META_COMMANDS: &[&str] = &["help", "handles", "quit", "exit", "clear"];

#[derive(Default)]
struct KeyholdHelper {
    handles: Vec<(String, HandleKind)>,
}

impl KeyholdHelper {
    fn heads(&self) -> Vec<String> {
        std::iter::once(ROOT_WORD.to_string())
            .chain(self.handles.iter().map(|(t, _)| t.clone()))
            .chain(META_COMMANDS.iter().map(|m| m.to_string()))
            .collect()
    }

    fn subcommands_for(&self, head: &str) -> Vec<&'static str> {
        if head == ROOT_WORD {
            return subcommands(None);
        }
        self.handles
            .iter()
            .find(|(t, _)| t == head)
            .map(|(_, kind)| subcommands(Some(*kind)))
            .unwrap_or_default()
    }
}

fn candidates<I: IntoIterator<Item = String>>(words: I, prefix: &str) -> Vec<Pair> {
    words
        .into_iter()
        .filter(|w| w.starts_with(prefix))
        .map(|w| Pair {
            display: w.clone(),
            replacement: w,
        })
        .collect()
}

impl Helper for KeyholdHelper {}
impl Validator for KeyholdHelper {}
impl Highlighter for KeyholdHelper {}
impl Hinter for KeyholdHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for KeyholdHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        let parts: Vec<&str> = line_to_pos.split_whitespace().collect();
        let trailing_space = line_to_pos.ends_with(' ');

        match (parts.len(), trailing_space) {
            (0, _) | (1, false) => {
                let prefix = parts.first().copied().unwrap_or("");
                Ok((pos - prefix.len(), candidates(self.heads(), prefix)))
            }
            (1, true) => {
                let subs = self.subcommands_for(parts[0]);
                Ok((pos, candidates(subs.into_iter().map(String::from), "")))
            }
            (2, false) => {
                let subs = self.subcommands_for(parts[0]);
                let prefix = parts[1];
                Ok((
                    pos - prefix.len(),
                    candidates(subs.into_iter().map(String::from), prefix),
                ))
            }
            _ => Ok((pos, vec![])),
        }
    }
}
