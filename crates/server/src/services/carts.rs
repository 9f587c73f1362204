//! Cart repository.
//!
//! Typed CRUD over carts. Validation happens here, before anything reaches
//! the store; deletion goes through the same compare-and-delete primitive as
//! migration so the two can race safely.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use baattak_core::{CartId, CartState, CustomerName, OrderItem, PhoneNumber};

use super::CartError;
use crate::db::RecordStore;
use crate::models::{Cart, NewCart};

/// Raw checkout submission, before validation.
#[derive(Debug, Clone, Default)]
pub struct CreateCart {
    /// Customer name as typed.
    pub customer: String,
    /// Phone number as typed.
    pub phone: String,
    /// Ordered items.
    pub items: Vec<OrderItem>,
    /// Total number of units.
    pub total_quantity: u32,
    /// Total price.
    pub total_price: Decimal,
}

/// Repository for cart operations.
#[derive(Clone)]
pub struct CartRepository {
    store: Arc<dyn RecordStore>,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate a checkout submission and persist it as a new cart.
    ///
    /// The customer identified by `(customer, phone)` is created or refreshed
    /// in the same store operation as the cart insert.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if the customer name or phone is blank.
    /// Returns `CartError::Store` if the store rejects the write.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_cart(&self, request: CreateCart) -> Result<Cart, CartError> {
        let customer = CustomerName::parse(&request.customer)?;
        let phone = PhoneNumber::parse(&request.phone)?;

        let cart = self
            .store
            .create_cart(NewCart {
                customer,
                phone,
                items: request.items,
                total_quantity: request.total_quantity,
                total_price: request.total_price,
            })
            .await?;

        info!(
            cart_id = %cart.id,
            customer = %cart.customer,
            total_price = %cart.total_price,
            "Cart created"
        );
        Ok(cart)
    }

    /// All current carts.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store query fails.
    pub async fn list_carts(&self) -> Result<Vec<Cart>, CartError> {
        Ok(self.store.list_carts().await?)
    }

    /// Look up a single cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if no such cart exists.
    pub async fn get_cart(&self, id: CartId) -> Result<Cart, CartError> {
        self.store
            .get_cart(id)
            .await?
            .ok_or(CartError::NotFound(id))
    }

    /// The first cart whose customer name matches `customer` exactly.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoCartForCustomer` if the customer has no cart.
    pub async fn find_cart_by_customer(&self, customer: &str) -> Result<Cart, CartError> {
        self.store
            .find_cart_by_customer(customer)
            .await?
            .ok_or_else(|| CartError::NoCartForCustomer(customer.to_owned()))
    }

    /// Delete a cart without recording history.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the cart does not exist, including
    /// when a concurrent migrate or delete removed it first.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn delete_cart(&self, id: CartId) -> Result<(), CartError> {
        match self.store.take_cart(id, CartState::Deleted).await? {
            Some(cart) => {
                info!(
                    cart_id = %cart.id,
                    state = %CartState::Deleted,
                    "Cart deleted"
                );
                Ok(())
            }
            None => {
                debug!(cart_id = %id, "Cart not present for deletion");
                Err(CartError::NotFound(id))
            }
        }
    }
}
