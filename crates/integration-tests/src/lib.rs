//! Integration tests for Baattak.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p baattak-integration-tests
//!
//! # Record store tests against PostgreSQL
//! BAATTAK_DATABASE_URL=postgres://localhost/baattak_test cargo test -p baattak-integration-tests --test pg_store -- --ignored
//!
//! # Live-server tests against a running instance
//! BAATTAK_BASE_URL=http://localhost:3001 cargo test -p baattak-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_lifecycle` - Repository and migration properties, including races
//! - `expiry_sweep` - Sweeper selection, failure isolation, start/stop
//! - `http_api` - The router driven through `tower::ServiceExt::oneshot`
//! - `pg_store` - `PgRecordStore` against a real database (ignored by default)
//! - `live_server` - `reqwest` against a deployed server (ignored by default)
//!
//! This crate also provides the fixtures those tests share: a
//! fault-injecting [`FaultyStore`] and checkout builders.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use baattak_core::{CartId, CartState, OrderHistoryId, OrderItem};
use baattak_server::db::{MemoryRecordStore, RecordStore, StoreError};
use baattak_server::models::{Cart, Customer, NewCart, NewOrderHistoryEntry, OrderHistoryEntry};
use baattak_server::services::CreateCart;

/// A checkout for `customer` with one line of three teas at 2 each.
#[must_use]
pub fn checkout(customer: &str, phone: &str) -> CreateCart {
    CreateCart {
        customer: customer.to_string(),
        phone: phone.to_string(),
        items: vec![tea(3)],
        total_quantity: 3,
        total_price: Decimal::from(6),
    }
}

/// A tea order line.
#[must_use]
pub fn tea(quantity: u32) -> OrderItem {
    OrderItem {
        name: "Tea".to_string(),
        price: Decimal::from(2),
        quantity,
    }
}

/// [`MemoryRecordStore`] wrapper that fails or stalls on demand.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryRecordStore,
    history_failures: Mutex<HashSet<String>>,
    listing_fails: Mutex<bool>,
    listing_delay: Mutex<Option<Duration>>,
    history_delay: Mutex<Option<Duration>>,
}

impl FaultyStore {
    /// Create a store with no faults armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make order history inserts for `customer` fail.
    pub fn fail_history_for(&self, customer: &str) {
        self.history_failures.lock().insert(customer.to_string());
    }

    /// Make listing stale carts fail.
    pub fn fail_listing(&self) {
        *self.listing_fails.lock() = true;
    }

    /// Stall every stale-cart listing by `delay`.
    pub fn delay_listing(&self, delay: Duration) {
        *self.listing_delay.lock() = Some(delay);
    }

    /// Stall every order history insert by `delay`.
    pub fn delay_history(&self, delay: Duration) {
        *self.history_delay.lock() = Some(delay);
    }

    /// The store as the trait object services expect.
    #[must_use]
    pub fn shared(self: &Arc<Self>) -> Arc<dyn RecordStore> {
        Arc::clone(self) as Arc<dyn RecordStore>
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn create_cart(&self, cart: NewCart) -> Result<Cart, StoreError> {
        self.inner.create_cart(cart).await
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, StoreError> {
        self.inner.list_carts().await
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        self.inner.get_cart(id).await
    }

    async fn find_cart_by_customer(&self, customer: &str) -> Result<Option<Cart>, StoreError> {
        self.inner.find_cart_by_customer(customer).await
    }

    async fn cart_ids_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartId>, StoreError> {
        let delay = *self.listing_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.listing_fails.lock() {
            return Err(StoreError::Unavailable("injected listing failure".to_string()));
        }
        self.inner.cart_ids_created_before(cutoff).await
    }

    async fn take_cart(
        &self,
        id: CartId,
        outcome: CartState,
    ) -> Result<Option<Cart>, StoreError> {
        self.inner.take_cart(id, outcome).await
    }

    async fn cart_outcome(&self, id: CartId) -> Result<Option<CartState>, StoreError> {
        self.inner.cart_outcome(id).await
    }

    async fn insert_order_history(
        &self,
        entry: NewOrderHistoryEntry,
    ) -> Result<OrderHistoryEntry, StoreError> {
        let delay = *self.history_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let fail = self
            .history_failures
            .lock()
            .contains(entry.customer.as_str());
        if fail {
            return Err(StoreError::Unavailable(
                "injected order history failure".to_string(),
            ));
        }
        self.inner.insert_order_history(entry).await
    }

    async fn list_order_history(&self) -> Result<Vec<OrderHistoryEntry>, StoreError> {
        self.inner.list_order_history().await
    }

    async fn delete_order_history(&self, id: OrderHistoryId) -> Result<bool, StoreError> {
        self.inner.delete_order_history(id).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.inner.list_customers().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
