//! Cart model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use baattak_core::{CartId, CustomerName, OrderItem, PhoneNumber};

/// An in-progress order.
///
/// A cart exists in the store only while it is active. Migration moves it
/// into order history; deletion drops it. Neither leaves a cart row behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Name of the customer who checked out.
    pub customer: CustomerName,
    /// Customer phone number.
    pub phone: PhoneNumber,
    /// Ordered items.
    pub items: Vec<OrderItem>,
    /// Total number of units, as submitted.
    pub total_quantity: u32,
    /// Total price, as submitted.
    pub total_price: Decimal,
    /// When the cart was created. Drives expiry.
    pub created_at: DateTime<Utc>,
}

/// A validated checkout submission, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCart {
    /// Customer name (also the customer identity together with `phone`).
    pub customer: CustomerName,
    /// Customer phone number.
    pub phone: PhoneNumber,
    /// Ordered items.
    pub items: Vec<OrderItem>,
    /// Total number of units.
    pub total_quantity: u32,
    /// Total price.
    pub total_price: Decimal,
}
