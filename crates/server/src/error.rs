//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::CartError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart service operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human readable reason.
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::Validation(_) => StatusCode::BAD_REQUEST,
                CartError::NotFound(_)
                | CartError::NoCartForCustomer(_)
                | CartError::HistoryEntryNotFound(_) => StatusCode::NOT_FOUND,
                CartError::AlreadyProcessed(_) | CartError::Store(StoreError::Conflict(_)) => {
                    StatusCode::CONFLICT
                }
                CartError::MigrationFailure { .. } | CartError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Migration failures are already reported at error level by the service
        if let Self::Cart(CartError::Store(e)) = &self
            && !matches!(e, StoreError::Conflict(_))
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Cart(CartError::Store(StoreError::Conflict(_))) => {
                "Record already exists".to_string()
            }
            Self::Cart(CartError::Store(_) | CartError::MigrationFailure { .. }) => {
                "Internal server error".to_string()
            }
            Self::Cart(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(reason) => reason.clone(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
