//! Core types for keyhold
//!
//! This crate defines the foundational types shared by every layer:
//! - Value: host-facing value model (what a scripting host passes in and gets back)
//! - HandleKind / HandleId: handle classification and arena addressing
//! - Error: the error taxonomy (usage, handle, engine, config)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{EngineErrorKind, Error, ErrorCategory, Result};
pub use types::{HandleId, HandleKind};
pub use value::Value;
