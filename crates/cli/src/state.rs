//! Session wrapper that remembers the last result for `$_`.

use keyhold_executor::{Error, HandleKind, KeyholdConfig, Output, Result, Session};

use crate::parse::split_line;

/// Why a line did not produce an output.
#[derive(Debug)]
pub enum LineError {
    /// The line could not be split into words
    Parse(String),
    /// The command failed
    Command(Error),
}

/// Wraps the session and tracks the previous result.
pub struct SessionState {
    session: Session,
    last: Option<String>,
}

impl SessionState {
    /// Create a new state over a fresh session.
    pub fn new(config: KeyholdConfig) -> Self {
        Self {
            session: Session::with_config(config),
            last: None,
        }
    }

    /// Split and evaluate one command line.
    pub fn run_line(&mut self, line: &str) -> std::result::Result<Output, LineError> {
        let words = split_line(line, self.last.as_deref()).map_err(LineError::Parse)?;
        let output = self.eval(&words).map_err(LineError::Command)?;
        Ok(output)
    }

    fn eval(&mut self, words: &[keyhold_executor::Value]) -> Result<Output> {
        let output = self.session.eval(words)?;
        // Void results leave `$_` alone so `commit` doesn't lose the handle
        if output != Output::Unit {
            self.last = Some(output.clone().into_value().to_string());
        }
        Ok(output)
    }

    /// The previous non-void result, as text.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Open handles, sorted by token.
    pub fn handles(&self) -> Vec<(String, HandleKind)> {
        let mut handles = self.session.handles();
        handles.sort();
        handles
    }

    /// Generate the REPL prompt string.
    pub fn prompt(&self) -> String {
        match self.session.handles().len() {
            0 => "keyhold> ".to_string(),
            n => format!("keyhold({})> ", n),
        }
    }
}
