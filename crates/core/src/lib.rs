//! Baattak Core - Shared domain types.
//!
//! This crate provides the types shared by every Baattak component:
//! - `server` - Order-taking HTTP backend and cart expiry sweeper
//! - `cli` - Command-line tools for migrations and one-off sweeps
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. The optional `postgres` feature adds `sqlx` encoding for
//! the id newtypes so the server can bind them directly.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, customer contact fields, order items, cart lifecycle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
