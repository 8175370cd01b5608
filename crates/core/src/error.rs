//! Error types for keyhold
//!
//! All failures surfaced to a host are represented by the [`Error`] enum.
//! Errors are:
//! - **Structured**: each variant has typed fields naming the offending token,
//!   option or argument
//! - **Serializable**: can be converted to/from JSON for a host that wants it
//! - **Categorized**: [`Error::category`] tells usage mistakes, handle
//!   resolution failures and engine failures apart
//!
//! # Categories
//!
//! | Category | Variants | Raised |
//! |----------|----------|--------|
//! | Usage | `WrongArgs`, `UnknownSubcommand`, `UnknownOption`, `TypeError`, `MissingOption`, `InvalidArgument` | before any engine call |
//! | Handle | `UnknownHandle`, `DuplicateToken`, `InvalidState` | registry / lifecycle checks |
//! | Engine | `Engine` | non-zero engine status, message verbatim |
//! | Config | `Config` | loading `keyhold.toml` |

use serde::{Deserialize, Serialize};

use crate::types::HandleKind;

/// Result type alias for keyhold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error family, see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed call, detected before the engine was touched
    Usage,
    /// Token resolution or lifecycle state failure
    Handle,
    /// The engine returned a non-zero status
    Engine,
    /// Configuration could not be loaded
    Config,
}

/// Classification of engine status codes.
///
/// The numeric code in [`Error::Engine`] is auxiliary; callers that need to
/// branch on an engine failure match on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineErrorKind {
    /// Key/data pair already exists
    KeyExists,
    /// Key/data pair not found (also: cursor moved past the last entry)
    NotFound,
    /// Requested page not found, usually corruption
    PageNotFound,
    /// Located page was the wrong type
    Corrupted,
    /// Update of meta page failed or environment had a fatal error
    Panic,
    /// Environment version mismatch
    VersionMismatch,
    /// File is not a valid engine file
    Invalid,
    /// Environment map size reached
    MapFull,
    /// Environment maximum database count reached
    DbsFull,
    /// Environment maximum reader count reached
    ReadersFull,
    /// Too many thread-local storage keys in use
    TlsFull,
    /// Transaction has too many dirty pages
    TxnFull,
    /// Cursor stack too deep
    CursorFull,
    /// Page has not enough space
    PageFull,
    /// Database contents grew beyond environment map size
    MapResized,
    /// Operation and database incompatible, or database flags changed
    Incompatible,
    /// Invalid reuse of reader locktable slot
    BadReaderSlot,
    /// Transaction must abort, has a child, or is invalid
    BadTransaction,
    /// Unsupported size of key/database name/data, or wrong dupfixed size
    BadValueSize,
    /// The specified database was changed unexpectedly
    BadDbi,
    /// Operating-system error number
    Os,
    /// Anything else
    Other,
}

/// Command layer errors.
///
/// Every failure aborts only the in-flight operation; the session's registry
/// is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Usage ====================
    /// Wrong number or shape of arguments
    #[error("wrong # args: should be \"{usage}\"")]
    WrongArgs {
        /// Expected call shape
        usage: String,
    },

    /// Subcommand not valid for this handle kind
    #[error("bad subcommand \"{name}\" for {kind}: must be {valid}")]
    UnknownSubcommand {
        /// Kind of the handle the subcommand was sent to ("lmdb" for the root)
        kind: String,
        /// The rejected subcommand
        name: String,
        /// Comma separated list of valid subcommands
        valid: String,
    },

    /// Option name not in the subcommand's option table
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The rejected option word
        name: String,
    },

    /// Option value could not be converted to the expected type
    #[error("expected {expected} value for {option}")]
    TypeError {
        /// Option (or positional argument) name
        option: String,
        /// Expected value type
        expected: String,
    },

    /// Required option absent after the full scan
    #[error("missing required option {name}")]
    MissingOption {
        /// The missing option name
        name: String,
    },

    /// Argument present and well-typed but not acceptable
    #[error("invalid {name}: {reason}")]
    InvalidArgument {
        /// Argument name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    // ==================== Handle ====================
    /// Token not registered in this session, or registered as another kind
    #[error("invalid {} handle {token}", expected.map(HandleKind::name).unwrap_or("command"))]
    UnknownHandle {
        /// The token that failed to resolve
        token: String,
        /// The kind the caller expected, if any
        expected: Option<HandleKind>,
    },

    /// Token already registered
    #[error("handle {token} already exists")]
    DuplicateToken {
        /// The colliding token
        token: String,
    },

    /// Handle exists but its lifecycle state forbids the operation
    #[error("{token} is {state}: cannot {operation}")]
    InvalidState {
        /// The handle's token
        token: String,
        /// Current lifecycle state
        state: String,
        /// Operation that was refused
        operation: String,
    },

    // ==================== Engine ====================
    /// Non-zero engine status, message verbatim from the engine
    #[error("ERROR: {message}")]
    Engine {
        /// Raw engine status code
        code: i32,
        /// Classified status
        kind: EngineErrorKind,
        /// The engine's own description of the status
        message: String,
    },

    // ==================== Config ====================
    /// Configuration file could not be read or parsed
    #[error("config error: {reason}")]
    Config {
        /// What went wrong
        reason: String,
    },
}

impl Error {
    /// The error family this variant belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::WrongArgs { .. }
            | Error::UnknownSubcommand { .. }
            | Error::UnknownOption { .. }
            | Error::TypeError { .. }
            | Error::MissingOption { .. }
            | Error::InvalidArgument { .. } => ErrorCategory::Usage,
            Error::UnknownHandle { .. }
            | Error::DuplicateToken { .. }
            | Error::InvalidState { .. } => ErrorCategory::Handle,
            Error::Engine { .. } => ErrorCategory::Engine,
            Error::Config { .. } => ErrorCategory::Config,
        }
    }

    /// True for an engine "not found" status (missing key, cursor exhausted).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Engine {
                kind: EngineErrorKind::NotFound,
                ..
            }
        )
    }

    /// Engine kind, if this is an engine error.
    pub fn engine_kind(&self) -> Option<EngineErrorKind> {
        match self {
            Error::Engine { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Shorthand for [`Error::WrongArgs`].
    pub fn wrong_args(usage: impl Into<String>) -> Self {
        Error::WrongArgs {
            usage: usage.into(),
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::UnknownHandle`].
    pub fn unknown_handle(token: impl Into<String>, expected: Option<HandleKind>) -> Self {
        Error::UnknownHandle {
            token: token.into(),
            expected,
        }
    }

    /// Shorthand for [`Error::InvalidState`].
    pub fn invalid_state(
        token: impl Into<String>,
        state: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Error::InvalidState {
            token: token.into(),
            state: state.into(),
            operation: operation.into(),
        }
    }

    /// Shorthand for [`Error::Config`].
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }
}
