//! Record storage for carts, order history, and customers.
//!
//! # Stores
//!
//! - [`PgRecordStore`] - `PostgreSQL`, the durable production store
//! - [`MemoryRecordStore`] - in-process arena for local runs and tests
//!
//! Both implement [`RecordStore`], the only path through which records are
//! written. Services hold an `Arc<dyn RecordStore>` and never see which
//! backend they talk to.
//!
//! ## Tables
//!
//! - `customers` - Checkout identities, unique on `(username, phone_number)`
//! - `carts` - In-flight carts (row exists iff the cart is active)
//! - `cart_outcomes` - Terminal state of every removed cart
//! - `order_history` - Append-only completed orders
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p baattak-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use baattak_core::{CartId, CartState, OrderHistoryId};

use crate::models::{Cart, Customer, NewCart, NewOrderHistoryEntry, OrderHistoryEntry};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., an email already used by another customer).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent keyed storage for carts, order history, and customers.
///
/// Implementations must make every method atomic with respect to concurrent
/// callers. In particular [`RecordStore::take_cart`] is the compare-and-delete
/// primitive that decides which of several racing migrate/delete calls wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert the customer identified by `(cart.customer, cart.phone)` and
    /// insert a new cart stamped with the current time, as one unit.
    async fn create_cart(&self, cart: NewCart) -> Result<Cart, StoreError>;

    /// All active carts, oldest first.
    async fn list_carts(&self) -> Result<Vec<Cart>, StoreError>;

    /// Look up a cart by id.
    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, StoreError>;

    /// The oldest active cart whose customer name matches exactly.
    async fn find_cart_by_customer(&self, customer: &str) -> Result<Option<Cart>, StoreError>;

    /// Ids of active carts created strictly before `cutoff`, oldest first.
    ///
    /// Only ids are returned so one undecodable row cannot fail the listing;
    /// each cart is read again when it is migrated.
    async fn cart_ids_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartId>, StoreError>;

    /// Remove the cart if it is still present, record `outcome` as its
    /// terminal state, and return what was removed.
    ///
    /// Returns `Ok(None)` when another caller already removed it. `outcome`
    /// must be a terminal [`CartState`].
    async fn take_cart(&self, id: CartId, outcome: CartState)
    -> Result<Option<Cart>, StoreError>;

    /// The terminal state recorded when the cart was removed, if it ever was.
    async fn cart_outcome(&self, id: CartId) -> Result<Option<CartState>, StoreError>;

    /// Append an order history entry stamped with the current time.
    async fn insert_order_history(
        &self,
        entry: NewOrderHistoryEntry,
    ) -> Result<OrderHistoryEntry, StoreError>;

    /// All order history entries in insertion order.
    async fn list_order_history(&self) -> Result<Vec<OrderHistoryEntry>, StoreError>;

    /// Delete an order history entry. Returns whether a record was removed.
    async fn delete_order_history(&self, id: OrderHistoryId) -> Result<bool, StoreError>;

    /// All known customers, oldest first.
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
