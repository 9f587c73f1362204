//! Customer model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use baattak_core::{CustomerId, CustomerName, Email, PhoneNumber};

/// A customer known to the backend.
///
/// Customers are identified by `(username, phone_number)` and are upserted
/// whenever a cart is submitted under that identity. `email` is unique across
/// customers when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Customer name.
    pub username: CustomerName,
    /// Customer phone number.
    pub phone_number: PhoneNumber,
    /// Optional email address.
    pub email: Option<Email>,
    /// When the customer first checked out.
    pub created_at: DateTime<Utc>,
    /// Last checkout under this identity.
    pub updated_at: DateTime<Utc>,
}
