//! # keyhold executor
//!
//! The command layer a scripting host talks to. It turns host words into
//! typed [`Command`]s, resolves string tokens to native engine handles, and
//! returns one [`Output`] per call.
//!
//! - [`Session`] - per-thread registry, token generator and dispatcher
//! - [`Command`]/[`Output`] - typed command interface (for hosts that skip
//!   the word parser)
//! - [`Value`] - the host value model
//!
//! ## Quick Start
//!
//! ```text
//! use keyhold_executor::{Session, Value};
//!
//! let mut s = Session::new();
//! let env = s.eval(&["lmdb".into(), "env".into()])?.into_value().to_string();
//! s.eval(&[env.as_str().into(), "open".into(), "-path".into(), "/tmp/db".into()])?;
//! let db = s.eval(&["lmdb".into(), "open".into(), "-env".into(), env.as_str().into()])?;
//! ```
//!
//! ## Handle Kinds
//!
//! | Kind | Token | Created by |
//! |------|-------|------------|
//! | Environment | `env0` | `lmdb env` |
//! | Transaction | `env0.txn0` | `E txn` |
//! | Database | `dbi0` | `lmdb open` |
//! | Cursor | `dbi0.c0` | `D cursor` |

#![warn(missing_docs)]

mod command;
mod ids;
mod lifecycle;
mod options;
mod output;
mod registry;
mod router;
mod session;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API
// =============================================================================

pub use command::Command;
pub use ids::IdGenerator;
pub use lifecycle::{EnvState, TxnPhase};
pub use options::{FlagSet, ValueType};
pub use output::Output;
pub use registry::{Kinded, Registry, Rejected};
pub use router::{subcommands, ROOT_WORD};
pub use session::Session;

// Re-export core types so hosts don't need keyhold-core directly
pub use keyhold_core::{EngineErrorKind, Error, ErrorCategory, HandleId, HandleKind, Value};

// Re-export engine types that appear in commands and outputs
pub use keyhold_engine::{EnvInfo, KeyholdConfig, Position, Stat, Version, CONFIG_FILE_NAME};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
