//! Database (dbi) operations
//!
//! A database is a plain `MDB_dbi` number scoped to one environment; every
//! data operation goes through a live transaction.

use std::ptr;
use std::slice;

use keyhold_core::Result;
use lmdb_master_sys as ffi;

use crate::env::{c_path, Env};
use crate::stat::Stat;
use crate::status::check;
use crate::txn::Txn;

/// Engine database number.
pub type Dbi = ffi::MDB_dbi;

/// Borrowed bytes as an `MDB_val`. The engine never writes through it.
pub(crate) fn val(bytes: &[u8]) -> ffi::MDB_val {
    ffi::MDB_val {
        mv_size: bytes.len() as _,
        mv_data: bytes.as_ptr() as *mut _,
    }
}

pub(crate) fn empty_val() -> ffi::MDB_val {
    ffi::MDB_val {
        mv_size: 0,
        mv_data: ptr::null_mut(),
    }
}

/// Copy an engine-owned value out before the transaction moves on.
///
/// # Safety
///
/// `v` must describe memory that is valid for reads of `mv_size` bytes.
pub(crate) unsafe fn to_vec(v: &ffi::MDB_val) -> Vec<u8> {
    if v.mv_data.is_null() || v.mv_size == 0 {
        return Vec::new();
    }
    slice::from_raw_parts(v.mv_data as *const u8, v.mv_size as usize).to_vec()
}

/// Open (or create, with `CREATE`) a database inside `txn`.
///
/// # Safety
///
/// `txn` must be live.
pub unsafe fn open(txn: Txn, name: Option<&str>, flags: u32) -> Result<Dbi> {
    let name = name.map(|n| c_path("-name", n)).transpose()?;
    let name_ptr = name.as_ref().map_or(ptr::null(), |n| n.as_ptr());
    let mut dbi = 0;
    check(ffi::mdb_dbi_open(txn.as_ptr(), name_ptr, flags as _, &mut dbi))?;
    Ok(dbi)
}

/// Store a key/data pair.
///
/// # Safety
///
/// `txn` must be a live write transaction and `dbi` open in its environment.
pub unsafe fn put(txn: Txn, dbi: Dbi, key: &[u8], data: &[u8], flags: u32) -> Result<()> {
    let mut k = val(key);
    let mut d = val(data);
    check(ffi::mdb_put(txn.as_ptr(), dbi, &mut k, &mut d, flags as _))
}

/// Fetch the (first) data item for `key`.
///
/// # Safety
///
/// `txn` must be live and `dbi` open in its environment.
pub unsafe fn get(txn: Txn, dbi: Dbi, key: &[u8]) -> Result<Vec<u8>> {
    let mut k = val(key);
    let mut d = empty_val();
    check(ffi::mdb_get(txn.as_ptr(), dbi, &mut k, &mut d))?;
    Ok(to_vec(&d))
}

/// Delete `key`, or only the `key`/`data` pair in a dupsort database.
/// `None` deletes every item for the key.
///
/// # Safety
///
/// `txn` must be a live write transaction and `dbi` open in its environment.
pub unsafe fn del(txn: Txn, dbi: Dbi, key: &[u8], data: Option<&[u8]>) -> Result<()> {
    let mut k = val(key);
    match data {
        Some(data) => {
            let mut d = val(data);
            check(ffi::mdb_del(txn.as_ptr(), dbi, &mut k, &mut d))
        }
        None => check(ffi::mdb_del(txn.as_ptr(), dbi, &mut k, ptr::null_mut())),
    }
}

/// Empty the database, or delete it from the environment when `delete`.
///
/// # Safety
///
/// `txn` must be a live write transaction and `dbi` open in its environment.
pub unsafe fn drop(txn: Txn, dbi: Dbi, delete: bool) -> Result<()> {
    check(ffi::mdb_drop(txn.as_ptr(), dbi, delete as _))
}

/// Database statistics.
///
/// # Safety
///
/// `txn` must be live and `dbi` open in its environment.
pub unsafe fn stat(txn: Txn, dbi: Dbi) -> Result<Stat> {
    let mut raw: ffi::MDB_stat = std::mem::zeroed();
    check(ffi::mdb_stat(txn.as_ptr(), dbi, &mut raw))?;
    Ok(Stat::from(&raw))
}

/// Flags the database was opened with.
///
/// # Safety
///
/// `txn` must be live and `dbi` open in its environment.
pub unsafe fn flags(txn: Txn, dbi: Dbi) -> Result<u32> {
    let mut bits = 0;
    check(ffi::mdb_dbi_flags(txn.as_ptr(), dbi, &mut bits))?;
    Ok(bits as u32)
}

/// Release the database number.
///
/// # Safety
///
/// `env` must not have been closed. No transaction may still be using `dbi`.
pub unsafe fn close(env: Env, dbi: Dbi) {
    ffi::mdb_dbi_close(env.as_ptr(), dbi);
}
