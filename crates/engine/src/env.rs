//! Environment wrapper
//!
//! [`Env`] is a copyable reference to a native `MDB_env`. It carries no
//! ownership: the executor decides when [`Env::close`] runs, and every
//! method that touches the native side is `unsafe` with the single
//! precondition that the environment has not been closed.

use std::ffi::{CStr, CString};
use std::ptr::{self, NonNull};

use keyhold_core::{Error, Result};
use lmdb_master_sys as ffi;
use tracing::{debug, info};

use crate::stat::{EnvInfo, Stat};
use crate::status::{check, engine_error, ENOMEM};

/// Native environment reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Env(NonNull<ffi::MDB_env>);

pub(crate) fn c_path(name: &str, path: &str) -> Result<CString> {
    CString::new(path).map_err(|_| Error::invalid_argument(name, "path contains a NUL byte"))
}

impl Env {
    /// Allocate a new, unopened environment.
    pub fn create() -> Result<Env> {
        let mut raw = ptr::null_mut();
        // SAFETY: out-pointer to a local
        check(unsafe { ffi::mdb_env_create(&mut raw) })?;
        let env = NonNull::new(raw).ok_or_else(|| engine_error(ENOMEM))?;
        debug!(target: "keyhold::engine", "env created");
        Ok(Env(env))
    }

    /// Raw pointer, for calls that take the environment as a parameter.
    pub fn as_ptr(self) -> *mut ffi::MDB_env {
        self.0.as_ptr()
    }

    /// Open the environment at `path`.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn open(self, path: &str, flags: u32, mode: u32) -> Result<()> {
        let c = c_path("-path", path)?;
        check(ffi::mdb_env_open(self.as_ptr(), c.as_ptr(), flags as _, mode as _))?;
        info!(target: "keyhold::engine", path, flags, "env opened");
        Ok(())
    }

    /// Set the memory map size.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn set_map_size(self, size: usize) -> Result<()> {
        check(ffi::mdb_env_set_mapsize(self.as_ptr(), size as _))
    }

    /// Set the maximum number of reader slots.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn set_max_readers(self, readers: u32) -> Result<()> {
        check(ffi::mdb_env_set_maxreaders(self.as_ptr(), readers as _))
    }

    /// Set the maximum number of named databases.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn set_max_dbs(self, dbs: u32) -> Result<()> {
        check(ffi::mdb_env_set_maxdbs(self.as_ptr(), dbs as _))
    }

    /// Flush buffers to disk.
    ///
    /// # Safety
    ///
    /// The environment must be open.
    pub unsafe fn sync(self, force: bool) -> Result<()> {
        check(ffi::mdb_env_sync(self.as_ptr(), force as _))
    }

    /// Statistics for the main database.
    ///
    /// # Safety
    ///
    /// The environment must be open.
    pub unsafe fn stat(self) -> Result<Stat> {
        let mut raw: ffi::MDB_stat = std::mem::zeroed();
        check(ffi::mdb_env_stat(self.as_ptr(), &mut raw))?;
        Ok(Stat::from(&raw))
    }

    /// Environment information.
    ///
    /// # Safety
    ///
    /// The environment must be open.
    pub unsafe fn info(self) -> Result<EnvInfo> {
        let mut raw: ffi::MDB_envinfo = std::mem::zeroed();
        check(ffi::mdb_env_info(self.as_ptr(), &mut raw))?;
        Ok(EnvInfo::from(&raw))
    }

    /// Copy the environment to a directory (or file with `NOSUBDIR`).
    ///
    /// # Safety
    ///
    /// The environment must be open.
    pub unsafe fn copy(self, path: &str, flags: u32) -> Result<()> {
        let c = c_path("path", path)?;
        check(ffi::mdb_env_copy2(self.as_ptr(), c.as_ptr(), flags as _))
    }

    /// The path given to `open`.
    ///
    /// # Safety
    ///
    /// The environment must be open.
    pub unsafe fn path(self) -> Result<String> {
        let mut raw = ptr::null();
        check(ffi::mdb_env_get_path(self.as_ptr(), &mut raw))?;
        if raw.is_null() {
            return Ok(String::new());
        }
        Ok(CStr::from_ptr(raw).to_string_lossy().into_owned())
    }

    /// Maximum number of reader slots.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn max_readers(self) -> Result<u32> {
        let mut readers = 0;
        check(ffi::mdb_env_get_maxreaders(self.as_ptr(), &mut readers))?;
        Ok(readers as u32)
    }

    /// Maximum key size the environment accepts.
    ///
    /// # Safety
    ///
    /// The environment must not have been closed.
    pub unsafe fn max_key_size(self) -> i32 {
        ffi::mdb_env_get_maxkeysize(self.as_ptr()) as i32
    }

    /// Release the native environment.
    ///
    /// # Safety
    ///
    /// Must be called at most once, after every transaction and cursor that
    /// uses the environment has been released or abandoned.
    pub unsafe fn close(self) {
        ffi::mdb_env_close(self.as_ptr());
        info!(target: "keyhold::engine", "env closed");
    }
}
