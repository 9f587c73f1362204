//! In-process record store.
//!
//! Everything lives behind one `parking_lot::Mutex`, and each trait method
//! holds it for its whole body, so every operation (including the customer
//! upsert + cart insert pair) is atomic. Records are kept in insertion order.
//! Nothing survives a restart; use [`super::PgRecordStore`] for durability.
//!
//! Recorded cart outcomes are bounded: once more than the outcome capacity
//! have been recorded, the oldest are forgotten and a late `migrate` on such a
//! cart reports `NotFound` instead of `AlreadyProcessed`.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use baattak_core::{CartId, CartState, CustomerId, OrderHistoryId};

use super::{RecordStore, StoreError};
use crate::models::{Cart, Customer, NewCart, NewOrderHistoryEntry, OrderHistoryEntry};

/// Default number of cart outcomes remembered.
pub const DEFAULT_OUTCOME_CAPACITY: usize = 100_000;

#[derive(Debug, Default)]
struct Records {
    customers: Vec<Customer>,
    carts: Vec<Cart>,
    outcomes: HashMap<CartId, CartState>,
    outcome_order: VecDeque<CartId>,
    order_history: Vec<OrderHistoryEntry>,
}

/// Arena-style store keeping all records in memory.
#[derive(Debug)]
pub struct MemoryRecordStore {
    records: Mutex<Records>,
    outcome_capacity: usize,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::with_outcome_capacity(DEFAULT_OUTCOME_CAPACITY)
    }
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store remembering at most `capacity` cart outcomes.
    #[must_use]
    pub fn with_outcome_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Records::default()),
            outcome_capacity: capacity,
        }
    }
}

impl Records {
    fn upsert_customer(&mut self, cart: &NewCart, now: DateTime<Utc>) {
        if let Some(existing) = self
            .customers
            .iter_mut()
            .find(|c| c.username == cart.customer && c.phone_number == cart.phone)
        {
            existing.phone_number = cart.phone.clone();
            existing.updated_at = now;
            return;
        }

        self.customers.push(Customer {
            id: CustomerId::generate(),
            username: cart.customer.clone(),
            phone_number: cart.phone.clone(),
            email: None,
            created_at: now,
            updated_at: now,
        });
    }

    fn record_outcome(&mut self, id: CartId, outcome: CartState, capacity: usize) {
        self.outcomes.insert(id, outcome);
        self.outcome_order.push_back(id);
        while self.outcome_order.len() > capacity {
            if let Some(oldest) = self.outcome_order.pop_front() {
                self.outcomes.remove(&oldest);
            }
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_cart(&self, cart: NewCart) -> Result<Cart, StoreError> {
        let now = Utc::now();
        let mut records = self.records.lock();

        records.upsert_customer(&cart, now);

        let created = Cart {
            id: CartId::generate(),
            customer: cart.customer,
            phone: cart.phone,
            items: cart.items,
            total_quantity: cart.total_quantity,
            total_price: cart.total_price,
            created_at: now,
        };
        records.carts.push(created.clone());

        Ok(created)
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, StoreError> {
        Ok(self.records.lock().carts.clone())
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        Ok(self
            .records
            .lock()
            .carts
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_cart_by_customer(&self, customer: &str) -> Result<Option<Cart>, StoreError> {
        Ok(self
            .records
            .lock()
            .carts
            .iter()
            .find(|c| c.customer.as_str() == customer)
            .cloned())
    }

    async fn cart_ids_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartId>, StoreError> {
        Ok(self
            .records
            .lock()
            .carts
            .iter()
            .filter(|c| c.created_at < cutoff)
            .map(|c| c.id)
            .collect())
    }

    async fn take_cart(
        &self,
        id: CartId,
        outcome: CartState,
    ) -> Result<Option<Cart>, StoreError> {
        debug_assert!(CartState::Active.can_transition_to(outcome));
        let mut records = self.records.lock();
        let Some(index) = records.carts.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        records.record_outcome(id, outcome, self.outcome_capacity);
        Ok(Some(records.carts.remove(index)))
    }

    async fn cart_outcome(&self, id: CartId) -> Result<Option<CartState>, StoreError> {
        Ok(self.records.lock().outcomes.get(&id).copied())
    }

    async fn insert_order_history(
        &self,
        entry: NewOrderHistoryEntry,
    ) -> Result<OrderHistoryEntry, StoreError> {
        let created = OrderHistoryEntry {
            id: OrderHistoryId::generate(),
            customer: entry.customer,
            phone: entry.phone,
            items: entry.items,
            total_quantity: entry.total_quantity,
            total_price: entry.total_price,
            created_at: Utc::now(),
        };
        self.records.lock().order_history.push(created.clone());
        Ok(created)
    }

    async fn list_order_history(&self) -> Result<Vec<OrderHistoryEntry>, StoreError> {
        Ok(self.records.lock().order_history.clone())
    }

    async fn delete_order_history(&self, id: OrderHistoryId) -> Result<bool, StoreError> {
        let mut records = self.records.lock();
        let before = records.order_history.len();
        records.order_history.retain(|e| e.id != id);
        Ok(records.order_history.len() < before)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.records.lock().customers.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
