//! Transaction wrapper
//!
//! A [`Txn`] is valid from a successful [`Txn::begin`] until `commit` or
//! `abort` (on itself or on any ancestor). Reset keeps the native handle
//! alive for a later `renew`; only read-only transactions may be reset.

use std::ptr::{self, NonNull};

use keyhold_core::Result;
use lmdb_master_sys as ffi;

use crate::env::Env;
use crate::flags;
use crate::status::{check, engine_error, ENOMEM};

/// Native transaction reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Txn(NonNull<ffi::MDB_txn>);

impl Txn {
    /// Begin a transaction, optionally nested under `parent`.
    ///
    /// # Safety
    ///
    /// `env` must be open and `parent`, if given, must be live.
    pub unsafe fn begin(env: Env, parent: Option<Txn>, read_only: bool) -> Result<Txn> {
        let parent = parent.map_or(ptr::null_mut(), Txn::as_ptr);
        let flags = if read_only { flags::env::RDONLY } else { 0 };
        let mut raw = ptr::null_mut();
        check(ffi::mdb_txn_begin(env.as_ptr(), parent, flags as _, &mut raw))?;
        NonNull::new(raw).map(Txn).ok_or_else(|| engine_error(ENOMEM))
    }

    /// Raw pointer.
    pub fn as_ptr(self) -> *mut ffi::MDB_txn {
        self.0.as_ptr()
    }

    /// Commit. The native transaction is freed whatever the outcome.
    ///
    /// # Safety
    ///
    /// The transaction must be live.
    pub unsafe fn commit(self) -> Result<()> {
        check(ffi::mdb_txn_commit(self.as_ptr()))
    }

    /// Abort, freeing the native transaction.
    ///
    /// # Safety
    ///
    /// The transaction must be live.
    pub unsafe fn abort(self) {
        ffi::mdb_txn_abort(self.as_ptr());
    }

    /// Release the snapshot of a read-only transaction, keeping the handle.
    ///
    /// # Safety
    ///
    /// The transaction must be a live, active read-only transaction.
    pub unsafe fn reset(self) {
        ffi::mdb_txn_reset(self.as_ptr());
    }

    /// Reacquire a snapshot after `reset`.
    ///
    /// # Safety
    ///
    /// The transaction must have been reset and not aborted since.
    pub unsafe fn renew(self) -> Result<()> {
        check(ffi::mdb_txn_renew(self.as_ptr()))
    }

    /// The transaction ID. Zero for a reset read-only transaction.
    ///
    /// # Safety
    ///
    /// The transaction must be live.
    pub unsafe fn id(self) -> u64 {
        ffi::mdb_txn_id(self.as_ptr()) as u64
    }
}
