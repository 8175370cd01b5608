//! Session Layer Tests
//!
//! End-to-end tests through the public `keyhold` API:
//! - Host word evaluation (`Session::eval`) and typed commands
//! - Handle lifecycle across environments, transactions, databases, cursors
//! - Failure atomicity and session isolation
//! - Configuration loading

mod common;

mod atomicity;
mod config;
mod isolation;
mod lifecycle;
mod options;
mod scenarios;
