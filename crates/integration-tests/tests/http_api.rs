//! In-process HTTP tests.
//!
//! Drives the full router (middleware included) with
//! `tower::ServiceExt::oneshot` over an in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::TimeDelta;
use serde_json::{Value, json};
use tower::ServiceExt;

use baattak_integration_tests::FaultyStore;
use baattak_server::config::ServerConfig;
use baattak_server::db::{MemoryRecordStore, RecordStore};
use baattak_server::middleware::REQUEST_ID_HEADER;
use baattak_server::services::SweepConfig;
use baattak_server::state::AppState;

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryRecordStore::new()))
    }

    fn with_store(store: Arc<dyn RecordStore>) -> Self {
        let state = AppState::new(store, SweepConfig::default());
        let router = baattak_server::app(state.clone(), &ServerConfig::in_memory());
        Self { router, state }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    async fn create_ana(&self) -> Value {
        let (status, body) = self.send(Method::POST, "/carts", Some(ana_checkout())).await;
        assert_eq!(status, StatusCode::CREATED);
        body["cart"].clone()
    }
}

fn ana_checkout() -> Value {
    json!({
        "customer": "Ana",
        "phone": "555",
        "items": [{"name": "Tea", "price": 2, "quantity": 3}],
        "totalQuantity": 3,
        "totalPrice": 6
    })
}

// =============================================================================
// Create / read
// =============================================================================

#[tokio::test]
async fn test_create_cart_returns_created() {
    let app = TestApp::new();

    let cart = app.create_ana().await;

    assert_eq!(cart["customer"], "Ana");
    assert_eq!(cart["phone"], "555");
    assert_eq!(cart["totalQuantity"], 3);
    assert_eq!(cart["totalPrice"], "6");
    assert!(cart["createdAt"].is_string());
    assert!(cart["id"].is_string());
}

#[tokio::test]
async fn test_create_cart_blank_customer_is_bad_request() {
    let app = TestApp::new();

    let mut body = ana_checkout();
    body["customer"] = json!("   ");
    let (status, error) = app.send(Method::POST, "/carts", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "customer name is required");

    let (_, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(listing["carts"], json!([]));
}

#[tokio::test]
async fn test_create_cart_missing_phone_is_bad_request() {
    let app = TestApp::new();

    let (status, error) = app
        .send(Method::POST, "/carts", Some(json!({"customer": "Ana"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "phone number is required");
}

#[tokio::test]
async fn test_create_cart_malformed_body_is_bad_request() {
    let app = TestApp::new();

    let (status, error) = app
        .send(
            Method::POST,
            "/carts",
            Some(json!({"customer": "Ana", "phone": "555", "totalQuantity": "lots"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn test_list_and_find_by_customer() {
    let app = TestApp::new();
    let cart = app.create_ana().await;

    let (status, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["carts"].as_array().unwrap().len(), 1);

    let (status, found) = app.send(Method::GET, "/carts/by-customer/Ana", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["cart"]["id"], cart["id"]);

    let (status, _) = app.send(Method::GET, "/carts/by-customer/Bo", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_cart() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let uri = format!("/carts/{}", cart["id"].as_str().unwrap());

    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, history) = app.send(Method::GET, "/order-history", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_delete_unknown_cart_leaves_store_unchanged() {
    let app = TestApp::new();
    app.create_ana().await;

    let (status, _) = app
        .send(
            Method::DELETE,
            "/carts/00000000-0000-4000-8000-000000000000",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, "/carts/not-a-cart-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(listing["carts"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Migrate
// =============================================================================

#[tokio::test]
async fn test_migrate_cart() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let uri = format!("/carts/{}/migrate", cart["id"].as_str().unwrap());

    let (status, body) = app.send(Method::POST, &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["customer"], "Ana");
    assert_eq!(body["order"]["totalPrice"], "6");

    let (_, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(listing["carts"], json!([]));
}

#[tokio::test]
async fn test_migrate_unknown_cart_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Method::POST,
            "/carts/00000000-0000-4000-8000-000000000000/migrate",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_simultaneous_migrations_one_ok_one_conflict() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let uri = format!("/carts/{}/migrate", cart["id"].as_str().unwrap());

    let (first, second) = tokio::join!(
        app.send(Method::POST, &uri, None),
        app.send(Method::POST, &uri, None),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort_by_key(StatusCode::as_u16);
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let (_, history) = app.send(Method::GET, "/order-history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    let (_, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(listing["carts"], json!([]));
}

#[tokio::test]
async fn test_migrate_after_delete_is_conflict() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let id = cart["id"].as_str().unwrap();

    app.send(Method::DELETE, &format!("/carts/{id}"), None).await;
    let (status, _) = app
        .send(Method::POST, &format!("/carts/{id}/migrate"), None)
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failed_history_write_is_internal_error() {
    let faulty = Arc::new(FaultyStore::new());
    faulty.fail_history_for("Ana");
    let app = TestApp::with_store(faulty.shared());
    let cart = app.create_ana().await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/carts/{}/migrate", cart["id"].as_str().unwrap()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

// =============================================================================
// Sweep scenario
// =============================================================================

#[tokio::test]
async fn test_stale_cart_swept_into_history() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let created_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(cart["createdAt"].clone()).unwrap();

    let report = app
        .state
        .sweeper()
        .sweep_at(created_at + TimeDelta::minutes(5) + TimeDelta::seconds(1))
        .await
        .unwrap();
    assert_eq!(report.migrated, 1);

    let (_, listing) = app.send(Method::GET, "/carts", None).await;
    assert_eq!(listing["carts"], json!([]));

    let (_, history) = app.send(Method::GET, "/order-history", None).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["totalPrice"], "6");
}

// =============================================================================
// Order history and customers
// =============================================================================

#[tokio::test]
async fn test_delete_order_history_entry() {
    let app = TestApp::new();
    let cart = app.create_ana().await;
    let (_, migrated) = app
        .send(
            Method::POST,
            &format!("/carts/{}/migrate", cart["id"].as_str().unwrap()),
            None,
        )
        .await;
    let uri = format!("/order-history/{}", migrated["order"]["id"].as_str().unwrap());

    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customers_listed_once_per_identity() {
    let app = TestApp::new();
    app.create_ana().await;
    app.create_ana().await;

    let (status, customers) = app.send(Method::GET, "/customers", None).await;

    assert_eq!(status, StatusCode::OK);
    let customers = customers.as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["username"], "Ana");
    assert_eq!(customers[0]["phoneNumber"], "555");
}

// =============================================================================
// Health and middleware
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = app.send(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
}
