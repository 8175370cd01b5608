//! Cursor command handlers, plus `D cursor`.
//!
//! A cursor stays bound to the transaction it was opened (or last renewed)
//! under; every call checks that transaction is still active.

use keyhold_core::{Error, HandleKind, Result};
use keyhold_engine::{Operands, Position};

use super::validate_bytes;
use crate::lifecycle::{CursorRecord, Resource};
use crate::options::FlagSet;
use crate::{Output, Session};

/// Handle `D cursor -txn T`.
pub fn open(s: &mut Session, db: &str, txn: &str) -> Result<Output> {
    let shared = s.txn(txn)?;
    let record = CursorRecord::open(s.dbi(db)?, db, txn, shared)?;
    let token = s.expose(HandleKind::Cursor, Some(db), Resource::Cursor(record))?;
    Ok(Output::Handle(token))
}

/// Check the operands a positioning operator needs.
fn check_operands(position: Position, key: Option<&[u8]>, data: Option<&[u8]>) -> Result<()> {
    let (wants_key, wants_data) = match position.operands() {
        Operands::None => (false, false),
        Operands::Key => (true, false),
        Operands::KeyData => (true, true),
        Operands::IgnoredKeyData => {
            let given = key.is_some() || data.is_some();
            (given, given)
        }
    };
    for (name, wanted, given) in [("key", wants_key, key), ("data", wants_data, data)] {
        match (wanted, given) {
            (true, Some(bytes)) => validate_bytes(name, bytes)?,
            (true, None) => {
                return Err(Error::invalid_argument(
                    name,
                    format!("required by {}", position.option()),
                ))
            }
            (false, Some(_)) => {
                return Err(Error::invalid_argument(
                    name,
                    format!("not taken by {}", position.option()),
                ))
            }
            (false, None) => {}
        }
    }
    Ok(())
}

/// Handle `C get <position> ?key? ?data?`.
pub fn get(
    s: &mut Session,
    cursor: &str,
    position: Position,
    key: Option<&[u8]>,
    data: Option<&[u8]>,
) -> Result<Output> {
    check_operands(position, key, data)?;
    let (key, data) = match position.operands() {
        Operands::IgnoredKeyData => (None, None),
        _ => (key, data),
    };
    let (key, data) = s.cursor(cursor)?.get(cursor, position, key, data)?;
    Ok(Output::Pair { key, data })
}

/// Handle `C put`.
pub fn put(
    s: &mut Session,
    cursor: &str,
    key: &[u8],
    data: &[u8],
    write_flags: FlagSet,
) -> Result<Output> {
    validate_bytes("key", key)?;
    validate_bytes("data", data)?;
    s.cursor(cursor)?.put(cursor, key, data, write_flags.bits)?;
    Ok(Output::Unit)
}

/// Handle `C del ?-nodupdata?`.
pub fn del(s: &mut Session, cursor: &str, write_flags: FlagSet) -> Result<Output> {
    s.cursor(cursor)?.del(cursor, write_flags.bits)?;
    Ok(Output::Unit)
}

/// Handle `C count`.
pub fn count(s: &mut Session, cursor: &str) -> Result<Output> {
    let n = s.cursor(cursor)?.count(cursor)?;
    Ok(Output::Uint(n))
}

/// Handle `C renew -txn T`.
pub fn renew(s: &mut Session, cursor: &str, txn: &str) -> Result<Output> {
    let shared = s.txn(txn)?;
    s.cursor_mut(cursor)?.renew(cursor, txn, shared)?;
    Ok(Output::Unit)
}

/// Handle `C close`.
pub fn close(s: &mut Session, cursor: &str) -> Result<Output> {
    s.cursor(cursor)?;
    if let Some(Resource::Cursor(record)) = s.forget(cursor) {
        record.close(cursor);
    }
    Ok(Output::Unit)
}
