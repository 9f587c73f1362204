//! Core types for Baattak.
//!
//! This module provides type-safe wrappers for the order-taking domain.

pub mod contact;
pub mod email;
pub mod id;
pub mod item;
pub mod status;

pub use contact::{ContactError, CustomerName, PhoneNumber};
pub use email::{Email, EmailError};
pub use id::*;
pub use item::OrderItem;
pub use status::{CartState, UnknownCartState};
