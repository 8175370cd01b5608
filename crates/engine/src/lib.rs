//! Storage engine layer for keyhold
//!
//! This crate is the only place that talks to the LMDB C library:
//! - Env / Txn / Cursor: copyable references to native resources
//! - dbi: database operations through a transaction
//! - status: engine status codes to [`keyhold_core::Error`]
//! - flags: named flag bits
//! - config: `keyhold.toml`
//!
//! The wrappers own nothing. Whether a native resource is still valid is
//! tracked one layer up, in the executor's lifecycle records, which is why
//! every call that dereferences a native pointer is `unsafe`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod cursor;
pub mod dbi;
pub mod env;
pub mod flags;
pub mod stat;
pub mod status;
pub mod txn;
pub mod version;

pub use config::{KeyholdConfig, CONFIG_FILE_NAME};
pub use cursor::{Cursor, Operands, Position};
pub use dbi::Dbi;
pub use env::Env;
pub use stat::{EnvInfo, Stat};
pub use txn::Txn;
pub use version::{version, Version};
