//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::RecordStore;
use crate::services::{
    CartRepository, ExpirySweeper, MigrationService, OrderHistoryRepository, SweepConfig,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Every service holds the same
/// record store, so handlers and the expiry sweeper see one set of carts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn RecordStore>,
    carts: CartRepository,
    migration: MigrationService,
    history: OrderHistoryRepository,
    sweeper: Arc<ExpirySweeper>,
}

impl AppState {
    /// Create a new application state over `store`.
    ///
    /// The sweeper is built but not started; call
    /// [`ExpirySweeper::start`] on [`Self::sweeper`] to run it.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, sweep: SweepConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                carts: CartRepository::new(Arc::clone(&store)),
                migration: MigrationService::new(Arc::clone(&store)),
                history: OrderHistoryRepository::new(Arc::clone(&store)),
                sweeper: Arc::new(ExpirySweeper::new(Arc::clone(&store), sweep)),
                store,
            }),
        }
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }

    /// Get a reference to the cart repository.
    #[must_use]
    pub fn carts(&self) -> &CartRepository {
        &self.inner.carts
    }

    /// Get a reference to the migration service.
    #[must_use]
    pub fn migration(&self) -> &MigrationService {
        &self.inner.migration
    }

    /// Get a reference to the order history repository.
    #[must_use]
    pub fn history(&self) -> &OrderHistoryRepository {
        &self.inner.history
    }

    /// Get the expiry sweeper.
    #[must_use]
    pub fn sweeper(&self) -> Arc<ExpirySweeper> {
        Arc::clone(&self.inner.sweeper)
    }
}
