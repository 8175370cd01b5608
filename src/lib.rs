//! keyhold - string-addressable handles over the LMDB storage engine
//!
//! keyhold lets a scripting host drive LMDB environments, transactions,
//! databases and cursors through plain words. Every native object is named
//! by a token (`env0`, `env0.txn1`, `dbi0`, `dbi0.c2`) that is itself callable.
//!
//! # Quick Start
//!
//! ```ignore
//! use keyhold::{Session, Value};
//!
//! let mut session = Session::new();
//! let env = session.eval(&["lmdb".into(), "env".into()])?;
//! let env = env.handle().unwrap().to_string();
//! session.eval(&[env.as_str().into(), "open".into(), "-path".into(), "./data".into()])?;
//! ```
//!
//! # Architecture
//!
//! All calls go through a per-thread [`Session`], either as host words
//! ([`Session::eval`]) or as typed [`Command`]s ([`Session::execute`]).
//! The engine bindings and lifecycle bookkeeping are not exposed; only the
//! executor API is public.

// Re-export the public API from keyhold-executor
pub use keyhold_executor::*;
