//! Order history and customer listings.
//!
//! Entries are only ever created by [`super::MigrationService`]; this module
//! reads them back and lets an operator remove one.

use std::sync::Arc;

use tracing::{info, instrument};

use baattak_core::OrderHistoryId;

use super::CartError;
use crate::db::RecordStore;
use crate::models::{Customer, OrderHistoryEntry};

/// Read access to order history, plus operator deletion.
#[derive(Clone)]
pub struct OrderHistoryRepository {
    store: Arc<dyn RecordStore>,
}

impl OrderHistoryRepository {
    /// Create a new order history repository.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store query fails.
    pub async fn list_entries(&self) -> Result<Vec<OrderHistoryEntry>, CartError> {
        Ok(self.store.list_order_history().await?)
    }

    /// Remove one entry.
    ///
    /// # Errors
    ///
    /// Returns `CartError::HistoryEntryNotFound` if no such entry exists.
    #[instrument(skip(self), fields(order_history_id = %id))]
    pub async fn delete_entry(&self, id: OrderHistoryId) -> Result<(), CartError> {
        if self.store.delete_order_history(id).await? {
            info!(order_history_id = %id, "Order history entry deleted");
            Ok(())
        } else {
            Err(CartError::HistoryEntryNotFound(id))
        }
    }

    /// Customers recorded through checkout.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store query fails.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, CartError> {
        Ok(self.store.list_customers().await?)
    }
}
