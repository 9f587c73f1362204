//! Order line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a cart or order history entry.
///
/// Prices use decimal arithmetic. They serialize as strings and deserialize
/// from either JSON numbers or strings, so `{"price": 2}` and
/// `{"price": "2.00"}` are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Menu item name as shown at checkout.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Number of units ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Price of this line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
