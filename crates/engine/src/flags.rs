//! Named engine flag bits
//!
//! Callers never see raw bitmasks: every flag is reachable only through a
//! named option, and the executor's option tables refer to the constants
//! below. The values are the library's own.

use lmdb_master_sys as ffi;

/// Environment open flags.
pub mod env {
    use super::ffi;

    /// Map at a fixed address
    pub const FIXEDMAP: u32 = ffi::MDB_FIXEDMAP as u32;
    /// Path is the data file itself, not a directory
    pub const NOSUBDIR: u32 = ffi::MDB_NOSUBDIR as u32;
    /// Open read-only
    pub const RDONLY: u32 = ffi::MDB_RDONLY as u32;
    /// Don't fsync after commit
    pub const NOSYNC: u32 = ffi::MDB_NOSYNC as u32;
    /// Don't use read-ahead
    pub const NORDAHEAD: u32 = ffi::MDB_NORDAHEAD as u32;
}

/// Database open flags.
pub mod db {
    use super::ffi;

    /// Compare keys in reverse byte order
    pub const REVERSEKEY: u32 = ffi::MDB_REVERSEKEY as u32;
    /// Allow sorted duplicate data items per key
    pub const DUPSORT: u32 = ffi::MDB_DUPSORT as u32;
    /// Duplicate items are all the same size
    pub const DUPFIXED: u32 = ffi::MDB_DUPFIXED as u32;
    /// Compare duplicates in reverse byte order
    pub const REVERSEDUP: u32 = ffi::MDB_REVERSEDUP as u32;
    /// Create the database if it doesn't exist
    pub const CREATE: u32 = ffi::MDB_CREATE as u32;
    /// Keys are binary integers in native byte order
    pub const INTEGERKEY: u32 = ffi::MDB_INTEGERKEY as u32;
    /// Duplicates are binary integers
    pub const INTEGERDUP: u32 = ffi::MDB_INTEGERDUP as u32;

    /// Flag names reported by `flags`, in bit order.
    pub const NAMES: &[(u32, &str)] = &[
        (REVERSEKEY, "reversekey"),
        (DUPSORT, "dupsort"),
        (INTEGERKEY, "integerkey"),
        (DUPFIXED, "dupfixed"),
        (INTEGERDUP, "integerdup"),
        (REVERSEDUP, "reversedup"),
    ];
}

/// Write flags for put and cursor put/del.
pub mod write {
    use super::ffi;

    /// Don't write if the key/data pair already exists
    pub const NODUPDATA: u32 = ffi::MDB_NODUPDATA as u32;
    /// Don't write if the key already exists
    pub const NOOVERWRITE: u32 = ffi::MDB_NOOVERWRITE as u32;
    /// Data is being appended in key order
    pub const APPEND: u32 = ffi::MDB_APPEND as u32;
    /// Duplicate data is being appended in order
    pub const APPENDDUP: u32 = ffi::MDB_APPENDDUP as u32;
    /// Overwrite the item at the cursor position
    pub const CURRENT: u32 = ffi::MDB_CURRENT as u32;
}

/// Environment copy flags.
pub mod copy {
    use super::ffi;

    /// Omit free pages and renumber while copying
    pub const COMPACT: u32 = ffi::MDB_CP_COMPACT as u32;
}

/// Names of the database flags set in `bits`.
pub fn db_flag_names(bits: u32) -> Vec<&'static str> {
    db::NAMES
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}
