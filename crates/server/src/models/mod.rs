//! Domain models for records owned by the stores.
//!
//! Every model serializes with camelCase field names, which is the JSON shape
//! the ordering front-end sends and expects back.

pub mod cart;
pub mod customer;
pub mod order_history;

pub use cart::{Cart, NewCart};
pub use customer::Customer;
pub use order_history::{NewOrderHistoryEntry, OrderHistoryEntry};
