//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (fills the span field, tags Sentry, echoes the header)
//! 4. CORS
//! 5. Request timeout

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
