//! Order history model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use baattak_core::{CustomerName, OrderHistoryId, OrderItem, PhoneNumber};

use super::Cart;

/// A permanent record of a completed order.
///
/// Entries are only ever created by cart migration and are never updated.
/// `created_at` is the migration time, not the original cart's creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    /// Unique entry ID.
    pub id: OrderHistoryId,
    /// Customer name copied from the cart.
    pub customer: CustomerName,
    /// Customer phone copied from the cart.
    pub phone: PhoneNumber,
    /// Items copied from the cart.
    pub items: Vec<OrderItem>,
    /// Total quantity copied from the cart.
    pub total_quantity: u32,
    /// Total price copied from the cart.
    pub total_price: Decimal,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Order history entry fields taken from a migrated cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderHistoryEntry {
    pub customer: CustomerName,
    pub phone: PhoneNumber,
    pub items: Vec<OrderItem>,
    pub total_quantity: u32,
    pub total_price: Decimal,
}

impl From<&Cart> for NewOrderHistoryEntry {
    fn from(cart: &Cart) -> Self {
        Self {
            customer: cart.customer.clone(),
            phone: cart.phone.clone(),
            items: cart.items.clone(),
            total_quantity: cart.total_quantity,
            total_price: cart.total_price,
        }
    }
}
