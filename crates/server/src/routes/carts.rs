//! Cart route handlers.
//!
//! Handlers only translate between JSON and the cart services; all lifecycle
//! rules live in [`crate::services`].

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use baattak_core::{CartId, OrderItem};

use crate::error::{AppError, Result};
use crate::models::{Cart, OrderHistoryEntry};
use crate::services::CreateCart;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carts", post(create_cart).get(list_carts))
        .route("/carts/by-customer/{customer}", get(get_cart_by_customer))
        .route("/carts/{cart_id}", delete(delete_cart))
        .route("/carts/{cart_id}/migrate", post(migrate_cart))
}

/// Checkout submission.
///
/// Every field is optional on the wire so that a missing customer or phone
/// is reported as a validation error rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCartRequest {
    pub customer: Option<String>,
    pub phone: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_quantity: u32,
    pub total_price: Decimal,
}

impl From<CreateCartRequest> for CreateCart {
    fn from(request: CreateCartRequest) -> Self {
        Self {
            customer: request.customer.unwrap_or_default(),
            phone: request.phone.unwrap_or_default(),
            items: request.items,
            total_quantity: request.total_quantity,
            total_price: request.total_price,
        }
    }
}

/// Response for a created cart.
#[derive(Debug, Serialize)]
pub struct CartCreatedResponse {
    pub message: &'static str,
    pub cart: Cart,
}

/// Response for cart listings.
#[derive(Debug, Serialize)]
pub struct CartsResponse {
    pub carts: Vec<Cart>,
}

/// Response for a single cart.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
}

/// Response for a migrated cart.
#[derive(Debug, Serialize)]
pub struct MigratedResponse {
    pub message: &'static str,
    pub order: OrderHistoryEntry,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Parse a cart id from the path. Malformed ids cannot name a cart.
fn parse_cart_id(raw: &str) -> Result<CartId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Cart".to_string()))
}

/// Create a cart from a checkout submission.
///
/// # Errors
///
/// Returns 400 if the body is malformed or the customer or phone is blank.
pub async fn create_cart(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartCreatedResponse>)> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let cart = state.carts().create_cart(request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CartCreatedResponse {
            message: "Cart created",
            cart,
        }),
    ))
}

/// List all current carts.
///
/// # Errors
///
/// Returns 500 if the store query fails.
pub async fn list_carts(State(state): State<AppState>) -> Result<Json<CartsResponse>> {
    let carts = state.carts().list_carts().await?;
    Ok(Json(CartsResponse { carts }))
}

/// Look up the first cart for a customer name.
///
/// # Errors
///
/// Returns 404 if the customer has no cart.
pub async fn get_cart_by_customer(
    State(state): State<AppState>,
    Path(customer): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().find_cart_by_customer(&customer).await?;
    Ok(Json(CartResponse { cart }))
}

/// Delete a cart without recording history.
///
/// # Errors
///
/// Returns 404 if the cart does not exist.
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_cart_id(&cart_id)?;
    state.carts().delete_cart(id).await?;
    Ok(Json(MessageResponse {
        message: "Cart deleted",
    }))
}

/// Move a cart into order history now.
///
/// # Errors
///
/// Returns 404 if the cart does not exist, 409 if a concurrent caller
/// processed it first.
pub async fn migrate_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<MigratedResponse>> {
    let id = parse_cart_id(&cart_id)?;
    let order = state.migration().migrate(id).await?;
    Ok(Json(MigratedResponse {
        message: "Cart moved to order history",
        order,
    }))
}
