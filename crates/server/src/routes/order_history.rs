//! Order history and customer route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use baattak_core::OrderHistoryId;

use super::carts::MessageResponse;
use crate::error::{AppError, Result};
use crate::models::{Customer, OrderHistoryEntry};
use crate::state::AppState;

/// Build the order history router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order-history", get(list_order_history))
        .route("/order-history/{id}", delete(delete_order_history))
        .route("/customers", get(list_customers))
}

/// List all order history entries, oldest first.
///
/// # Errors
///
/// Returns 500 if the store query fails.
pub async fn list_order_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderHistoryEntry>>> {
    Ok(Json(state.history().list_entries().await?))
}

/// Remove one order history entry.
///
/// # Errors
///
/// Returns 404 if the entry does not exist or the id is malformed.
pub async fn delete_order_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: OrderHistoryId = id
        .parse()
        .map_err(|_| AppError::NotFound("Order history entry".to_string()))?;
    state.history().delete_entry(id).await?;
    Ok(Json(MessageResponse {
        message: "Order history entry deleted",
    }))
}

/// List customers recorded through checkout.
///
/// # Errors
///
/// Returns 500 if the store query fails.
pub async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    Ok(Json(state.history().list_customers().await?))
}
