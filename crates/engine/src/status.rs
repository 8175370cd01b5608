//! Engine status translation
//!
//! Every call into the C library returns an `int` status. [`check`] turns a
//! non-zero status into [`Error::Engine`], carrying the library's own
//! description verbatim along with a classified [`EngineErrorKind`].
//!
//! | Status | Kind |
//! |--------|------|
//! | `0` | success |
//! | `MDB_KEYEXIST` .. `MDB_BAD_DBI` | named kind |
//! | positive | `Os` (errno) |
//! | anything else | `Other` |

use std::ffi::CStr;

use keyhold_core::{EngineErrorKind, Error, Result};
use lmdb_master_sys as ffi;

const KEYEXIST: i32 = ffi::MDB_KEYEXIST as i32;
const NOTFOUND: i32 = ffi::MDB_NOTFOUND as i32;
const PAGE_NOTFOUND: i32 = ffi::MDB_PAGE_NOTFOUND as i32;
const CORRUPTED: i32 = ffi::MDB_CORRUPTED as i32;
const PANIC: i32 = ffi::MDB_PANIC as i32;
const VERSION_MISMATCH: i32 = ffi::MDB_VERSION_MISMATCH as i32;
const INVALID: i32 = ffi::MDB_INVALID as i32;
const MAP_FULL: i32 = ffi::MDB_MAP_FULL as i32;
const DBS_FULL: i32 = ffi::MDB_DBS_FULL as i32;
const READERS_FULL: i32 = ffi::MDB_READERS_FULL as i32;
const TLS_FULL: i32 = ffi::MDB_TLS_FULL as i32;
const TXN_FULL: i32 = ffi::MDB_TXN_FULL as i32;
const CURSOR_FULL: i32 = ffi::MDB_CURSOR_FULL as i32;
const PAGE_FULL: i32 = ffi::MDB_PAGE_FULL as i32;
const MAP_RESIZED: i32 = ffi::MDB_MAP_RESIZED as i32;
const INCOMPATIBLE: i32 = ffi::MDB_INCOMPATIBLE as i32;
const BAD_RSLOT: i32 = ffi::MDB_BAD_RSLOT as i32;
const BAD_TXN: i32 = ffi::MDB_BAD_TXN as i32;
const BAD_VALSIZE: i32 = ffi::MDB_BAD_VALSIZE as i32;
const BAD_DBI: i32 = ffi::MDB_BAD_DBI as i32;

/// errno reported when the library hands back a null handle on success.
pub(crate) const ENOMEM: i32 = 12;

/// Classify a raw status code.
pub fn classify(code: i32) -> EngineErrorKind {
    match code {
        KEYEXIST => EngineErrorKind::KeyExists,
        NOTFOUND => EngineErrorKind::NotFound,
        PAGE_NOTFOUND => EngineErrorKind::PageNotFound,
        CORRUPTED => EngineErrorKind::Corrupted,
        PANIC => EngineErrorKind::Panic,
        VERSION_MISMATCH => EngineErrorKind::VersionMismatch,
        INVALID => EngineErrorKind::Invalid,
        MAP_FULL => EngineErrorKind::MapFull,
        DBS_FULL => EngineErrorKind::DbsFull,
        READERS_FULL => EngineErrorKind::ReadersFull,
        TLS_FULL => EngineErrorKind::TlsFull,
        TXN_FULL => EngineErrorKind::TxnFull,
        CURSOR_FULL => EngineErrorKind::CursorFull,
        PAGE_FULL => EngineErrorKind::PageFull,
        MAP_RESIZED => EngineErrorKind::MapResized,
        INCOMPATIBLE => EngineErrorKind::Incompatible,
        BAD_RSLOT => EngineErrorKind::BadReaderSlot,
        BAD_TXN => EngineErrorKind::BadTransaction,
        BAD_VALSIZE => EngineErrorKind::BadValueSize,
        BAD_DBI => EngineErrorKind::BadDbi,
        c if c > 0 => EngineErrorKind::Os,
        _ => EngineErrorKind::Other,
    }
}

/// The library's description of a status code.
pub fn strerror(code: i32) -> String {
    // SAFETY: mdb_strerror returns a pointer to a static or thread-local
    // NUL-terminated string for every input.
    unsafe {
        let msg = ffi::mdb_strerror(code as _);
        if msg.is_null() {
            return format!("error code {}", code);
        }
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

/// Build the engine error for a non-zero status.
pub fn engine_error(code: i32) -> Error {
    Error::Engine {
        code,
        kind: classify(code),
        message: strerror(code),
    }
}

/// Map a status code to `Ok(())` or [`Error::Engine`].
#[inline]
pub fn check(code: i32) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(engine_error(code))
    }
}
