//! Transaction command handlers, plus `E txn`.

use keyhold_core::{HandleKind, Result};

use crate::lifecycle::{Resource, TxnShared};
use crate::{Output, Session};

/// Handle `E txn ?-parent T? ?-readonly?`.
pub fn begin(s: &mut Session, env: &str, parent: Option<&str>, read_only: bool) -> Result<Output> {
    let shared = s.env(env)?;
    let parent = match parent {
        Some(token) => Some((token, s.txn(token)?)),
        None => None,
    };
    let txn = TxnShared::begin(&shared, env, parent, read_only)?;
    let token = s.expose(HandleKind::Transaction, Some(env), Resource::Txn(txn))?;
    Ok(Output::Handle(token))
}

/// Handle `T abort`.
pub fn abort(s: &mut Session, txn: &str) -> Result<Output> {
    s.txn(txn)?.abort(txn)?;
    Ok(Output::Unit)
}

/// Handle `T commit`.
pub fn commit(s: &mut Session, txn: &str) -> Result<Output> {
    s.txn(txn)?.commit(txn)?;
    Ok(Output::Unit)
}

/// Handle `T reset`.
pub fn reset(s: &mut Session, txn: &str) -> Result<Output> {
    s.txn(txn)?.reset(txn)?;
    Ok(Output::Unit)
}

/// Handle `T renew`.
pub fn renew(s: &mut Session, txn: &str) -> Result<Output> {
    s.txn(txn)?.renew(txn)?;
    Ok(Output::Unit)
}

/// Handle `T id`.
pub fn id(s: &mut Session, txn: &str) -> Result<Output> {
    let id = s.txn(txn)?.id(txn)?;
    Ok(Output::TxnId(id))
}

/// Handle `T close`: drop the bookkeeping without ending the transaction.
pub fn close(s: &mut Session, txn: &str) -> Result<Output> {
    let shared = s.txn(txn)?;
    s.forget(txn);
    shared.detach(txn);
    Ok(Output::Unit)
}
