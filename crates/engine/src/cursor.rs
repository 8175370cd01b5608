//! Cursor wrapper and positioning operators

use std::ptr::{self, NonNull};

use keyhold_core::Result;
use lmdb_master_sys as ffi;
use serde::{Deserialize, Serialize};

use crate::dbi::{empty_val, to_vec, val, Dbi};
use crate::status::{check, engine_error, ENOMEM};
use crate::txn::Txn;

/// What a positioning operator needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// Bare switch
    None,
    /// A key to position at
    Key,
    /// A key and a data item
    KeyData,
    /// Either nothing or a key and data item, which the engine ignores
    IgnoredKeyData,
}

/// Cursor positioning operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Position at the exact key
    Set,
    /// Position at the first key greater than or equal to the given key
    SetRange,
    /// Return the pair at the current position
    Current,
    /// First pair
    First,
    /// First data item of the current key
    FirstDup,
    /// Last pair
    Last,
    /// Last data item of the current key
    LastDup,
    /// Next pair
    Next,
    /// Next data item of the current key
    NextDup,
    /// First data item of the next key
    NextNoDup,
    /// Previous pair
    Prev,
    /// Previous data item of the current key
    PrevDup,
    /// Last data item of the previous key
    PrevNoDup,
    /// Up to a page of duplicate items from the current position (dupfixed)
    GetMultiple,
    /// Up to a page of duplicate items from the next position (dupfixed)
    NextMultiple,
    /// Position at the exact key/data pair
    GetBoth,
    /// Position at the key with the nearest data item
    GetBothRange,
}

impl Position {
    /// Every operator, in the order the option table lists them.
    pub const ALL: [Position; 17] = [
        Position::Set,
        Position::SetRange,
        Position::Current,
        Position::First,
        Position::FirstDup,
        Position::Last,
        Position::LastDup,
        Position::Next,
        Position::NextDup,
        Position::NextNoDup,
        Position::Prev,
        Position::PrevDup,
        Position::PrevNoDup,
        Position::GetMultiple,
        Position::NextMultiple,
        Position::GetBoth,
        Position::GetBothRange,
    ];

    /// Option word, including the leading `-`.
    pub const fn option(self) -> &'static str {
        match self {
            Position::Set => "-set",
            Position::SetRange => "-set_range",
            Position::Current => "-current",
            Position::First => "-first",
            Position::FirstDup => "-firstdup",
            Position::Last => "-last",
            Position::LastDup => "-lastdup",
            Position::Next => "-next",
            Position::NextDup => "-nextdup",
            Position::NextNoDup => "-nextnodup",
            Position::Prev => "-prev",
            Position::PrevDup => "-prevdup",
            Position::PrevNoDup => "-prevnodup",
            Position::GetMultiple => "-get_multiple",
            Position::NextMultiple => "-next_multiple",
            Position::GetBoth => "-get_both",
            Position::GetBothRange => "-get_both_range",
        }
    }

    /// Look up an operator by its option word.
    pub fn from_option(word: &str) -> Option<Position> {
        Position::ALL.iter().copied().find(|p| p.option() == word)
    }

    /// Operands the operator takes.
    pub const fn operands(self) -> Operands {
        match self {
            Position::Set | Position::SetRange => Operands::Key,
            Position::GetBoth | Position::GetBothRange => Operands::KeyData,
            Position::GetMultiple | Position::NextMultiple => Operands::IgnoredKeyData,
            _ => Operands::None,
        }
    }

    fn op(self) -> ffi::MDB_cursor_op {
        match self {
            Position::Set => ffi::MDB_SET,
            Position::SetRange => ffi::MDB_SET_RANGE,
            Position::Current => ffi::MDB_GET_CURRENT,
            Position::First => ffi::MDB_FIRST,
            Position::FirstDup => ffi::MDB_FIRST_DUP,
            Position::Last => ffi::MDB_LAST,
            Position::LastDup => ffi::MDB_LAST_DUP,
            Position::Next => ffi::MDB_NEXT,
            Position::NextDup => ffi::MDB_NEXT_DUP,
            Position::NextNoDup => ffi::MDB_NEXT_NODUP,
            Position::Prev => ffi::MDB_PREV,
            Position::PrevDup => ffi::MDB_PREV_DUP,
            Position::PrevNoDup => ffi::MDB_PREV_NODUP,
            Position::GetMultiple => ffi::MDB_GET_MULTIPLE,
            Position::NextMultiple => ffi::MDB_NEXT_MULTIPLE,
            Position::GetBoth => ffi::MDB_GET_BOTH,
            Position::GetBothRange => ffi::MDB_GET_BOTH_RANGE,
        }
    }
}

/// Native cursor reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(NonNull<ffi::MDB_cursor>);

impl Cursor {
    /// Open a cursor on `dbi` under `txn`.
    ///
    /// # Safety
    ///
    /// `txn` must be live and `dbi` open in its environment.
    pub unsafe fn open(txn: Txn, dbi: Dbi) -> Result<Cursor> {
        let mut raw = ptr::null_mut();
        check(ffi::mdb_cursor_open(txn.as_ptr(), dbi, &mut raw))?;
        NonNull::new(raw).map(Cursor).ok_or_else(|| engine_error(ENOMEM))
    }

    fn as_ptr(self) -> *mut ffi::MDB_cursor {
        self.0.as_ptr()
    }

    /// Move the cursor and return the pair at the new position.
    ///
    /// # Safety
    ///
    /// The cursor and the transaction it is bound to must be live.
    pub unsafe fn get(
        self,
        position: Position,
        key: Option<&[u8]>,
        data: Option<&[u8]>,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut k = key.map_or_else(empty_val, val);
        let mut d = data.map_or_else(empty_val, val);
        check(ffi::mdb_cursor_get(self.as_ptr(), &mut k, &mut d, position.op()))?;
        Ok((to_vec(&k), to_vec(&d)))
    }

    /// Store a pair at (or near) the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must be live and bound to a live write transaction.
    pub unsafe fn put(self, key: &[u8], data: &[u8], flags: u32) -> Result<()> {
        let mut k = val(key);
        let mut d = val(data);
        check(ffi::mdb_cursor_put(self.as_ptr(), &mut k, &mut d, flags as _))
    }

    /// Delete the pair at the cursor (all duplicates with `NODUPDATA`).
    ///
    /// # Safety
    ///
    /// The cursor must be live and bound to a live write transaction.
    pub unsafe fn del(self, flags: u32) -> Result<()> {
        check(ffi::mdb_cursor_del(self.as_ptr(), flags as _))
    }

    /// Number of duplicates for the current key.
    ///
    /// # Safety
    ///
    /// The cursor and its transaction must be live.
    pub unsafe fn count(self) -> Result<u64> {
        let mut count = 0;
        check(ffi::mdb_cursor_count(self.as_ptr(), &mut count))?;
        Ok(count as u64)
    }

    /// Rebind a read-only cursor to another read-only transaction.
    ///
    /// # Safety
    ///
    /// The cursor and `txn` must be live.
    pub unsafe fn renew(self, txn: Txn) -> Result<()> {
        check(ffi::mdb_cursor_renew(txn.as_ptr(), self.as_ptr()))
    }

    /// Free the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must be live: a cursor opened in a write transaction is
    /// freed by the engine when that transaction ends.
    pub unsafe fn close(self) {
        ffi::mdb_cursor_close(self.as_ptr());
    }
}
