//! Common test utilities for session tests

#![allow(dead_code)]

use keyhold::{KeyholdConfig, Output, Result, Session, Value};
use tempfile::TempDir;

/// Session with room for named databases
pub fn create_session() -> Session {
    Session::with_config(KeyholdConfig {
        max_dbs: Some(8),
        ..KeyholdConfig::default()
    })
}

/// Split a command line on whitespace into host words
pub fn words(line: &str) -> Vec<Value> {
    line.split_whitespace().map(Value::from).collect()
}

/// Evaluate a whitespace-separated command line
pub fn eval(session: &mut Session, line: &str) -> Result<Output> {
    session.eval(&words(line))
}

/// Evaluate a handle-creating line and return the token
pub fn mint(session: &mut Session, line: &str) -> String {
    match eval(session, line) {
        Ok(Output::Handle(token)) => token,
        other => panic!("`{}` should create a handle, got {:?}", line, other),
    }
}

/// Create and open an environment in a fresh temp directory
pub fn open_env(session: &mut Session) -> (String, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let env = mint(session, "lmdb env");
    eval(
        session,
        &format!("{} open -path {}", env, dir.path().to_str().unwrap()),
    )
    .unwrap();
    (env, dir)
}

/// Extract bytes from Output::Bytes
pub fn bytes(output: Output) -> Vec<u8> {
    match output {
        Output::Bytes(b) => b,
        other => panic!("Expected Output::Bytes, got {:?}", other),
    }
}
