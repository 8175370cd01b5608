//! Command enum defining every keyhold operation.
//!
//! Commands are the typed form of a host call. [`Session::eval`] parses host
//! words into a `Command`; [`Session::execute`] runs one. Commands are:
//! - **Self-contained**: every token and argument the call needs is in the variant
//! - **Serializable**: can be logged or replayed as JSON
//! - **Typed**: flags travel as a [`FlagSet`], keys and data as raw bytes
//!
//! [`Session::eval`]: crate::Session::eval
//! [`Session::execute`]: crate::Session::execute

use keyhold_engine::Position;
use serde::{Deserialize, Serialize};

use crate::options::FlagSet;

/// A command addressed to the root or to one handle.
///
/// # Command Categories
///
/// | Category | Count | Addressed to |
/// |----------|-------|--------------|
/// | Root | 3 | `lmdb` |
/// | Environment | 13 | `env<N>` |
/// | Transaction | 6 | `<env>.txn<N>` |
/// | Database | 8 | `dbi<N>` |
/// | Cursor | 6 | `<dbi>.c<N>` |
///
/// # Example
///
/// ```ignore
/// use keyhold_executor::{Command, Output, Session};
///
/// let mut session = Session::new();
/// let env = match session.execute(Command::EnvCreate)? {
///     Output::Handle(token) => token,
///     _ => unreachable!(),
/// };
/// session.execute(Command::EnvOpen {
///     env: env.clone(),
///     path: "/tmp/db".into(),
///     mode: None,
///     flags: Default::default(),
///     reverse_key: None,
/// })?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Root (3) ====================
    /// Create an environment.
    /// Returns: `Output::Handle`
    EnvCreate,

    /// Open a database in an open environment.
    /// Returns: `Output::Handle`
    DbiOpen {
        env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        txn: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        flags: FlagSet,
    },

    /// Engine library version.
    /// Returns: `Output::Version` or `Output::VersionString`
    Version { as_string: bool },

    // ==================== Environment (13) ====================
    /// Open the environment at `path`.
    /// Returns: `Output::Unit`
    EnvOpen {
        env: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
        #[serde(default)]
        flags: FlagSet,
        /// Default key ordering for databases opened in this environment
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reverse_key: Option<bool>,
    },

    /// Returns: `Output::Unit`
    EnvSetMapSize { env: String, size: u64 },

    /// Returns: `Output::Unit`
    EnvSetMaxReaders { env: String, readers: u32 },

    /// Returns: `Output::Unit`
    EnvSetMaxDbs { env: String, dbs: u32 },

    /// Flush to disk. `force == false` does nothing.
    /// Returns: `Output::Unit`
    EnvSync { env: String, force: bool },

    /// Returns: `Output::Stat`
    EnvStat { env: String },

    /// Returns: `Output::EnvInfo`
    EnvInfo { env: String },

    /// Returns: `Output::Unit`
    EnvCopy {
        env: String,
        path: String,
        #[serde(default)]
        compact: bool,
    },

    /// Returns: `Output::Path`
    EnvGetPath { env: String },

    /// Returns: `Output::Uint`
    EnvGetMaxReaders { env: String },

    /// Returns: `Output::Uint`
    EnvGetMaxKeySize { env: String },

    /// Returns: `Output::Unit`
    EnvClose { env: String },

    /// Begin a transaction.
    /// Returns: `Output::Handle`
    TxnBegin {
        env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
        #[serde(default)]
        read_only: bool,
    },

    // ==================== Transaction (6) ====================
    /// Returns: `Output::Unit`
    TxnAbort { txn: String },

    /// Returns: `Output::Unit`
    TxnCommit { txn: String },

    /// Returns: `Output::Unit`
    TxnReset { txn: String },

    /// Returns: `Output::Unit`
    TxnRenew { txn: String },

    /// Forget the token without committing or aborting.
    /// Returns: `Output::Unit`
    TxnClose { txn: String },

    /// Returns: `Output::TxnId`
    TxnId { txn: String },

    // ==================== Database (8) ====================
    /// Returns: `Output::Unit`
    DbiPut {
        dbi: String,
        txn: String,
        key: Vec<u8>,
        data: Vec<u8>,
        #[serde(default)]
        flags: FlagSet,
    },

    /// Returns: `Output::Bytes`
    DbiGet {
        dbi: String,
        txn: String,
        key: Vec<u8>,
    },

    /// Delete a key; `data: None` removes every duplicate.
    /// Returns: `Output::Unit`
    DbiDel {
        dbi: String,
        txn: String,
        key: Vec<u8>,
        #[serde(default)]
        data: Option<Vec<u8>>,
    },

    /// Empty the database, or delete it when `delete`.
    /// Returns: `Output::Unit`
    DbiDrop {
        dbi: String,
        txn: String,
        delete: bool,
    },

    /// Returns: `Output::Unit`
    DbiClose { dbi: String, env: String },

    /// Returns: `Output::Stat`
    DbiStat { dbi: String, txn: String },

    /// Returns: `Output::Flags`
    DbiFlags { dbi: String, txn: String },

    /// Returns: `Output::Handle`
    CursorOpen { dbi: String, txn: String },

    // ==================== Cursor (6) ====================
    /// Returns: `Output::Pair`
    CursorGet {
        cursor: String,
        position: Position,
        #[serde(default)]
        key: Option<Vec<u8>>,
        #[serde(default)]
        data: Option<Vec<u8>>,
    },

    /// Returns: `Output::Unit`
    CursorPut {
        cursor: String,
        key: Vec<u8>,
        data: Vec<u8>,
        #[serde(default)]
        flags: FlagSet,
    },

    /// Returns: `Output::Unit`
    CursorDel {
        cursor: String,
        #[serde(default)]
        flags: FlagSet,
    },

    /// Returns: `Output::Uint`
    CursorCount { cursor: String },

    /// Returns: `Output::Unit`
    CursorRenew { cursor: String, txn: String },

    /// Returns: `Output::Unit`
    CursorClose { cursor: String },
}

impl Command {
    /// Subcommand name as the host spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Command::EnvCreate => "env",
            Command::DbiOpen { .. } => "open",
            Command::Version { .. } => "version",
            Command::EnvOpen { .. } => "open",
            Command::EnvSetMapSize { .. } => "set_mapsize",
            Command::EnvSetMaxReaders { .. } => "set_maxreaders",
            Command::EnvSetMaxDbs { .. } => "set_maxdbs",
            Command::EnvSync { .. } => "sync",
            Command::EnvStat { .. } => "stat",
            Command::EnvInfo { .. } => "info",
            Command::EnvCopy { .. } => "copy",
            Command::EnvGetPath { .. } => "get_path",
            Command::EnvGetMaxReaders { .. } => "get_maxreaders",
            Command::EnvGetMaxKeySize { .. } => "get_maxkeysize",
            Command::EnvClose { .. } => "close",
            Command::TxnBegin { .. } => "txn",
            Command::TxnAbort { .. } => "abort",
            Command::TxnCommit { .. } => "commit",
            Command::TxnReset { .. } => "reset",
            Command::TxnRenew { .. } => "renew",
            Command::TxnClose { .. } => "close",
            Command::TxnId { .. } => "id",
            Command::DbiPut { .. } => "put",
            Command::DbiGet { .. } => "get",
            Command::DbiDel { .. } => "del",
            Command::DbiDrop { .. } => "drop",
            Command::DbiClose { .. } => "close",
            Command::DbiStat { .. } => "stat",
            Command::DbiFlags { .. } => "flags",
            Command::CursorOpen { .. } => "cursor",
            Command::CursorGet { .. } => "get",
            Command::CursorPut { .. } => "put",
            Command::CursorDel { .. } => "del",
            Command::CursorCount { .. } => "count",
            Command::CursorRenew { .. } => "renew",
            Command::CursorClose { .. } => "close",
        }
    }
}
