//! Database command handlers, plus `lmdb open`.
//!
//! Every data operation names its transaction explicitly. The transaction
//! must be active and must run in the environment the database was opened
//! in.

use keyhold_core::{HandleKind, Result};
use keyhold_engine::{dbi, flags, Dbi, Txn};
use tracing::debug;

use super::{validate_bytes, validate_text};
use crate::lifecycle::{DbiRecord, Resource};
use crate::options::FlagSet;
use crate::{Output, Session};

/// Resolve a database and the transaction it is used under.
fn in_txn(s: &Session, db: &str, txn: &str, operation: &str) -> Result<(Dbi, Txn)> {
    let record = s.dbi(db)?;
    let dbi = record.dbi(db, operation)?;
    let shared = s.txn(txn)?;
    record.check_txn(txn, &shared)?;
    let raw = shared.active(txn, operation)?;
    Ok((dbi, raw))
}

/// Handle `lmdb open -env E ?-txn T? ?-name N? ?flags?`.
pub fn open(
    s: &mut Session,
    env: &str,
    txn: Option<&str>,
    name: Option<&str>,
    db_flags: FlagSet,
) -> Result<Output> {
    if let Some(name) = name {
        validate_text("-name", name)?;
    }
    let shared = s.env(env)?;
    let txn = match txn {
        Some(token) => Some((token, s.txn(token)?)),
        None => None,
    };
    let bits = db_flags.over(shared.default_db_flags());
    let record = DbiRecord::open(&shared, env, txn, name, bits)?;
    let token = s.expose(HandleKind::Database, None, Resource::Dbi(record))?;
    Ok(Output::Handle(token))
}

/// Handle `D put`.
pub fn put(
    s: &mut Session,
    db: &str,
    txn: &str,
    key: &[u8],
    data: &[u8],
    write_flags: FlagSet,
) -> Result<Output> {
    validate_bytes("key", key)?;
    validate_bytes("data", data)?;
    let (dbi, raw) = in_txn(s, db, txn, "put")?;
    // SAFETY: active transaction in the database's environment.
    unsafe { dbi::put(raw, dbi, key, data, write_flags.bits)? };
    Ok(Output::Unit)
}

/// Handle `D get`.
pub fn get(s: &mut Session, db: &str, txn: &str, key: &[u8]) -> Result<Output> {
    validate_bytes("key", key)?;
    let (dbi, raw) = in_txn(s, db, txn, "get")?;
    // SAFETY: as above.
    let data = unsafe { dbi::get(raw, dbi, key)? };
    Ok(Output::Bytes(data))
}

/// Handle `D del`. Missing or empty data deletes every duplicate of `key`.
pub fn del(s: &mut Session, db: &str, txn: &str, key: &[u8], data: Option<&[u8]>) -> Result<Output> {
    validate_bytes("key", key)?;
    let data = data.filter(|d| !d.is_empty());
    let (dbi, raw) = in_txn(s, db, txn, "del")?;
    // SAFETY: as above.
    unsafe { dbi::del(raw, dbi, key, data)? };
    Ok(Output::Unit)
}

/// Handle `D drop`: empty the database, or delete it when `delete` is set.
pub fn drop(s: &mut Session, db: &str, txn: &str, delete: bool) -> Result<Output> {
    let (dbi, raw) = in_txn(s, db, txn, "drop")?;
    // SAFETY: as above.
    unsafe { dbi::drop(raw, dbi, delete)? };
    Ok(Output::Unit)
}

/// Handle `D stat`.
pub fn stat(s: &mut Session, db: &str, txn: &str) -> Result<Output> {
    let (dbi, raw) = in_txn(s, db, txn, "stat")?;
    // SAFETY: as above.
    let stat = unsafe { dbi::stat(raw, dbi)? };
    Ok(Output::Stat(stat))
}

/// Handle `D flags`.
pub fn flags(s: &mut Session, db: &str, txn: &str) -> Result<Output> {
    let (dbi, raw) = in_txn(s, db, txn, "flags")?;
    // SAFETY: as above.
    let bits = unsafe { dbi::flags(raw, dbi)? };
    let names = flags::db_flag_names(bits)
        .into_iter()
        .map(String::from)
        .collect();
    Ok(Output::Flags(names))
}

/// Handle `D close -env E`.
pub fn close(s: &mut Session, db: &str, env: &str) -> Result<Output> {
    let shared = s.env(env)?;
    let raw_env = s.dbi(db)?.closable(db, env, &shared)?;
    if let Some(Resource::Dbi(record)) = s.forget(db) {
        record.close(raw_env);
        debug!(target: "keyhold::session", token = db, env, "database released");
    }
    Ok(Output::Unit)
}

