//! Handle classification and arena addressing.
//!
//! Every resource the host can name is one of four [`HandleKind`]s. Inside a
//! session the resource lives in an arena slot addressed by a [`HandleId`];
//! the host only ever sees the string token minted for it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of native resource a token can stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandleKind {
    /// Root handle: one storage-engine instance bound to a filesystem location
    Environment,
    /// Read or read-write transaction, possibly nested
    Transaction,
    /// Named key-value namespace within an environment
    Database,
    /// Position within one database under one transaction
    Cursor,
}

impl HandleKind {
    /// All kinds, in dependency order (roots first).
    pub const ALL: [HandleKind; 4] = [
        HandleKind::Environment,
        HandleKind::Transaction,
        HandleKind::Database,
        HandleKind::Cursor,
    ];

    /// Token prefix used when minting names for this kind.
    ///
    /// Environments and databases are named at the root (`env0`, `dbi3`);
    /// transactions and cursors are named under their parent
    /// (`env0.txn1`, `dbi3.c7`).
    pub fn prefix(self) -> &'static str {
        match self {
            HandleKind::Environment => "env",
            HandleKind::Transaction => "txn",
            HandleKind::Database => "dbi",
            HandleKind::Cursor => "c",
        }
    }

    /// Lower-case name used in error messages ("invalid txn handle ...").
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Environment => "env",
            HandleKind::Transaction => "txn",
            HandleKind::Database => "dbi",
            HandleKind::Cursor => "cursor",
        }
    }

    /// Dense index, used for per-kind counters.
    pub fn index(self) -> usize {
        match self {
            HandleKind::Environment => 0,
            HandleKind::Transaction => 1,
            HandleKind::Database => 2,
            HandleKind::Cursor => 3,
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arena address of a live handle.
///
/// `index` names a slot, `generation` the occupant. Freeing a slot bumps its
/// generation, so an id kept past a close never resolves to whatever later
/// reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId {
    /// Slot index
    pub index: u32,
    /// Occupant generation
    pub generation: u32,
}

impl HandleId {
    /// Create a handle id
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
