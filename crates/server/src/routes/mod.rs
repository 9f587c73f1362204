//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Readiness check (store ping)
//!
//! # Carts
//! POST   /carts                        - Create cart from checkout
//! GET    /carts                        - List carts
//! GET    /carts/by-customer/{customer} - First cart for a customer name
//! DELETE /carts/{cart_id}              - Delete cart, no history
//! POST   /carts/{cart_id}/migrate      - Move cart into order history now
//!
//! # Order history
//! GET    /order-history                - List entries
//! DELETE /order-history/{id}           - Delete entry
//! GET    /customers                    - List customers
//! ```

pub mod carts;
pub mod order_history;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Create the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(carts::router())
        .merge(order_history::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the record store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
