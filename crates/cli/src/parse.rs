//! Line → host words, with `$_` expansion and REPL meta-commands.

use keyhold_executor::Value;

/// Word replaced by the previous command's result.
pub const LAST_RESULT: &str = "$_";

/// REPL meta-commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help { command: Option<String> },
    Handles,
    Quit,
    Clear,
}

/// Check for REPL meta-commands before splitting a command line.
///
/// Returns `Some(MetaCommand)` if the line is a meta-command, `None` otherwise.
pub fn check_meta_command(line: &str) -> Option<MetaCommand> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?;

    match cmd {
        "quit" | "exit" => Some(MetaCommand::Quit),
        "clear" => Some(MetaCommand::Clear),
        "handles" => Some(MetaCommand::Handles),
        "help" => Some(MetaCommand::Help {
            command: parts.next().map(str::to_string),
        }),
        _ => None,
    }
}

/// True for lines that carry no command.
pub fn is_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Split a line into host words.
///
/// Quoting follows POSIX shell rules. A word that is exactly `$_` becomes the
/// previous result; it is an error when there is none.
pub fn split_line(line: &str, last: Option<&str>) -> Result<Vec<Value>, String> {
    let tokens = shlex::split(line).ok_or_else(|| format!("Invalid quoting: {}", line))?;
    tokens
        .into_iter()
        .map(|word| {
            if word == LAST_RESULT {
                last.map(Value::from)
                    .ok_or_else(|| format!("{} used before any result", LAST_RESULT))
            } else {
                Ok(Value::String(word))
            }
        })
        .collect()
}
