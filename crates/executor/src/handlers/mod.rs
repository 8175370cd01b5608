//! Command handlers organized by handle kind.
//!
//! | Module | Commands | Handle |
//! |--------|----------|--------|
//! | `env` | 14 | Environment (plus `lmdb env`, `lmdb version`) |
//! | `txn` | 7 | Transaction (plus `E txn`) |
//! | `dbi` | 8 | Database (plus `lmdb open`) |
//! | `cursor` | 7 | Cursor (plus `D cursor`) |
//!
//! Handlers check argument shape first, then resolve tokens, then check
//! lifecycle state, and only then call the engine. A failure at any step
//! leaves the session untouched.

pub mod cursor;
pub mod dbi;
pub mod env;
pub mod txn;

use keyhold_core::{Error, Result};

/// Keys and stored data must be non-empty.
pub(crate) fn validate_bytes(name: &str, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::invalid_argument(name, "must not be empty"));
    }
    Ok(())
}

/// Paths and database names go to the engine as C strings.
pub(crate) fn validate_text(name: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::invalid_argument(name, "must not be empty"));
    }
    if text.contains('\0') {
        return Err(Error::invalid_argument(name, "contains a NUL byte"));
    }
    Ok(())
}
