//! Cart lifecycle services.
//!
//! - [`carts`] - Cart repository: create, list, look up, delete
//! - [`migration`] - The exactly-once cart -> order history move
//! - [`sweeper`] - Periodic migration of stale carts
//! - [`history`] - Order history and customer listings
//!
//! All of them share [`CartError`], which is what the request layer maps to
//! HTTP responses.

pub mod carts;
pub mod history;
pub mod migration;
pub mod sweeper;

use thiserror::Error;

use baattak_core::{CartId, ContactError, OrderHistoryId};

use crate::db::StoreError;
use crate::models::Cart;

pub use carts::{CartRepository, CreateCart};
pub use history::OrderHistoryRepository;
pub use migration::MigrationService;
pub use sweeper::{
    DEFAULT_STALE_AFTER, DEFAULT_SWEEP_PERIOD, ExpirySweeper, SweepConfig, SweepReport,
    SweeperHandle,
};

/// Errors produced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A required field is missing or blank.
    #[error("{0}")]
    Validation(#[from] ContactError),

    /// The referenced cart does not exist.
    #[error("cart {0} not found")]
    NotFound(CartId),

    /// The customer has no active cart.
    #[error("no cart found for customer {0}")]
    NoCartForCustomer(String),

    /// The referenced order history entry does not exist.
    #[error("order history entry {0} not found")]
    HistoryEntryNotFound(OrderHistoryId),

    /// Another caller migrated or deleted the cart first.
    #[error("cart {0} was already processed")]
    AlreadyProcessed(CartId),

    /// The cart was removed but its order history entry could not be written.
    ///
    /// The removed cart is carried along so it can be recovered by hand.
    #[error("cart {cart_id} was removed but its order history entry was not written: {source}")]
    MigrationFailure {
        /// ID of the lost cart.
        cart_id: CartId,
        /// The cart that no longer exists anywhere else.
        cart: Box<Cart>,
        /// Why the history write failed.
        source: StoreError,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CartError {
    /// Whether this error means records may have been lost.
    #[must_use]
    pub const fn is_data_loss(&self) -> bool {
        matches!(self, Self::MigrationFailure { .. })
    }
}
