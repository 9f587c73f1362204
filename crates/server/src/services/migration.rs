//! Cart migration: the single choke point through which a cart becomes an
//! order history entry.
//!
//! The move is ordered delete-then-create and gated on the delete:
//! 1. Look the cart up (`AlreadyProcessed` if it was already migrated or
//!    deleted, `NotFound` if it never existed)
//! 2. Compare-and-delete it, recording `Migrated` as its outcome
//!    (`AlreadyProcessed` if another caller won)
//! 3. Write the order history entry with a fresh timestamp
//!
//! Only the caller whose delete actually removed the row reaches step 3, so a
//! cart yields at most one history entry no matter how many sweeps, operator
//! requests, or deletes race on it. If step 3 fails the cart is gone without
//! history; that is reported as `MigrationFailure` and logged at error level.
//!
//! Steps 2 and 3 run on a spawned task, so dropping the caller's future (a
//! request timeout, a disconnected client) cannot stop between them.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, instrument};

use baattak_core::{CartId, CartState};

use super::CartError;
use crate::db::{RecordStore, StoreError};
use crate::models::{NewOrderHistoryEntry, OrderHistoryEntry};

/// Moves carts into order history exactly once.
#[derive(Clone)]
pub struct MigrationService {
    store: Arc<dyn RecordStore>,
}

impl MigrationService {
    /// Create a new migration service.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Migrate one cart into order history.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the cart never existed
    /// - `CartError::AlreadyProcessed` if the cart was already migrated or
    ///   deleted, including by a concurrent caller between lookup and delete
    /// - `CartError::MigrationFailure` if the cart was removed but the history
    ///   entry could not be written
    /// - `CartError::Store` if the lookup or delete failed
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn migrate(&self, id: CartId) -> Result<OrderHistoryEntry, CartError> {
        if self.store.get_cart(id).await?.is_none() {
            return match self.store.cart_outcome(id).await? {
                Some(outcome) => {
                    debug!(cart_id = %id, outcome = %outcome, "Cart already processed");
                    Err(CartError::AlreadyProcessed(id))
                }
                None => Err(CartError::NotFound(id)),
            };
        }

        // Once the cart is taken the move has to finish, so it runs on its own
        // task that outlives a cancelled caller.
        let task =
            tokio::spawn(move_into_history(Arc::clone(&self.store), id).in_current_span());
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(cart_id = %id, error = %e, "Migration task ended abnormally");
                Err(CartError::Store(StoreError::Unavailable(format!(
                    "migration task ended abnormally: {e}"
                ))))
            }
        }
    }
}

/// Compare-and-delete the cart, then write its order history entry.
async fn move_into_history(
    store: Arc<dyn RecordStore>,
    id: CartId,
) -> Result<OrderHistoryEntry, CartError> {
    let Some(cart) = store.take_cart(id, CartState::Migrated).await? else {
        debug!(cart_id = %id, "Cart already processed by a concurrent caller");
        return Err(CartError::AlreadyProcessed(id));
    };

    match store
        .insert_order_history(NewOrderHistoryEntry::from(&cart))
        .await
    {
        Ok(entry) => {
            info!(
                cart_id = %id,
                order_history_id = %entry.id,
                state = %CartState::Migrated,
                total_price = %entry.total_price,
                "Cart migrated to order history"
            );
            Ok(entry)
        }
        Err(source) => {
            let lost = serde_json::to_string(&cart).unwrap_or_default();
            error!(
                cart_id = %id,
                error = %source,
                lost_cart = %lost,
                "Cart removed but order history entry was not written"
            );
            Err(CartError::MigrationFailure {
                cart_id: id,
                cart: Box::new(cart),
                source,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use baattak_core::{CustomerName, OrderItem, PhoneNumber};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryRecordStore;
    use crate::models::{Cart, NewCart};

    async fn setup() -> (Arc<MemoryRecordStore>, MigrationService, Cart) {
        let store = Arc::new(MemoryRecordStore::new());
        let cart = store
            .create_cart(NewCart {
                customer: CustomerName::parse("Ana").unwrap(),
                phone: PhoneNumber::parse("555").unwrap(),
                items: vec![OrderItem {
                    name: "Tea".to_string(),
                    price: Decimal::from(2),
                    quantity: 3,
                }],
                total_quantity: 3,
                total_price: Decimal::from(6),
            })
            .await
            .unwrap();
        let service = MigrationService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        (store, service, cart)
    }

    #[tokio::test]
    async fn test_migrate_moves_cart_into_history() {
        let (store, service, cart) = setup().await;

        let entry = service.migrate(cart.id).await.unwrap();

        assert_eq!(entry.customer, cart.customer);
        assert_eq!(entry.phone, cart.phone);
        assert_eq!(entry.items, cart.items);
        assert_eq!(entry.total_price, Decimal::from(6));
        assert!(entry.created_at >= cart.created_at);
        assert!(store.get_cart(cart.id).await.unwrap().is_none());
        assert_eq!(store.list_order_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_migrate_is_already_processed() {
        let (store, service, cart) = setup().await;

        service.migrate(cart.id).await.unwrap();
        let second = service.migrate(cart.id).await;

        assert!(matches!(second, Err(CartError::AlreadyProcessed(id)) if id == cart.id));
        assert_eq!(store.list_order_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_migrate_after_delete_is_already_processed() {
        let (store, service, cart) = setup().await;

        store.take_cart(cart.id, CartState::Deleted).await.unwrap();
        let result = service.migrate(cart.id).await;

        assert!(matches!(result, Err(CartError::AlreadyProcessed(_))));
        assert!(store.list_order_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migrate_unknown_cart_is_not_found() {
        let (store, service, _) = setup().await;

        let result = service.migrate(CartId::generate()).await;

        assert!(matches!(result, Err(CartError::NotFound(_))));
        assert_eq!(store.list_carts().await.unwrap().len(), 1);
    }
}
