//! Test modules for the executor crate.

pub mod session;

use keyhold_engine::flags;
use tempfile::TempDir;

use crate::{Command, FlagSet, KeyholdConfig, Output, Result, Session};

/// Session with room for a few named databases.
pub(crate) fn test_session() -> Session {
    Session::with_config(KeyholdConfig {
        max_dbs: Some(8),
        ..KeyholdConfig::default()
    })
}

/// Unwrap a handle-creating result.
pub(crate) fn handle(result: Result<Output>) -> String {
    match result {
        Ok(Output::Handle(token)) => token,
        other => panic!("expected a handle, got {:?}", other),
    }
}

/// Create and open an environment in a fresh directory.
pub(crate) fn open_env(s: &mut Session) -> (String, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let env = handle(s.execute(Command::EnvCreate));
    s.execute(Command::EnvOpen {
        env: env.clone(),
        path: dir.path().to_str().unwrap().to_string(),
        mode: None,
        flags: FlagSet::default(),
        reverse_key: None,
    })
    .unwrap();
    (env, dir)
}

/// Open (creating) a named database outside any caller transaction.
pub(crate) fn open_db(s: &mut Session, env: &str, name: &str, extra: u32) -> String {
    handle(s.execute(Command::DbiOpen {
        env: env.to_string(),
        txn: None,
        name: Some(name.to_string()),
        flags: FlagSet::default()
            .with(flags::db::CREATE, true)
            .with(extra, extra != 0),
    }))
}

pub(crate) fn begin(s: &mut Session, env: &str, read_only: bool) -> String {
    handle(s.execute(Command::TxnBegin {
        env: env.to_string(),
        parent: None,
        read_only,
    }))
}

pub(crate) fn put(s: &mut Session, dbi: &str, txn: &str, key: &[u8], data: &[u8]) -> Result<Output> {
    s.execute(Command::DbiPut {
        dbi: dbi.to_string(),
        txn: txn.to_string(),
        key: key.to_vec(),
        data: data.to_vec(),
        flags: FlagSet::default(),
    })
}

pub(crate) fn get(s: &mut Session, dbi: &str, txn: &str, key: &[u8]) -> Result<Output> {
    s.execute(Command::DbiGet {
        dbi: dbi.to_string(),
        txn: txn.to_string(),
        key: key.to_vec(),
    })
}

pub(crate) fn commit(s: &mut Session, txn: &str) -> Result<Output> {
    s.execute(Command::TxnCommit {
        txn: txn.to_string(),
    })
}
