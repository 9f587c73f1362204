//! Live-server tests.
//!
//! These tests require a running server:
//! - `baattak-cli migrate` applied to its database
//! - `baattak-server` listening at `BAATTAK_BASE_URL` (default `http://localhost:3001`)
//!
//! Run with: `cargo test -p baattak-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the server (configurable via environment).
fn base_url() -> String {
    std::env::var("BAATTAK_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Create a cart for a customer name unique to this run.
async fn create_cart(client: &Client, customer: &str) -> Value {
    let resp = client
        .post(format!("{}/carts", base_url()))
        .json(&json!({
            "customer": customer,
            "phone": "555",
            "items": [{"name": "Tea", "price": 2, "quantity": 3}],
            "totalQuantity": 3,
            "totalPrice": 6
        }))
        .send()
        .await
        .expect("Failed to create cart");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Invalid cart response");
    body["cart"].clone()
}

fn unique_customer() -> String {
    format!(
        "live-test-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_health() {
    let resp = client()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Cart lifecycle
// ============================================================================

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_create_and_migrate() {
    let client = client();
    let customer = unique_customer();
    let cart = create_cart(&client, &customer).await;
    let id = cart["id"].as_str().expect("cart id");

    let resp = client
        .post(format!("{}/carts/{id}/migrate", base_url()))
        .send()
        .await
        .expect("Failed to migrate cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid migrate response");
    assert_eq!(body["order"]["customer"], customer.as_str());

    let resp = client
        .post(format!("{}/carts/{id}/migrate", base_url()))
        .send()
        .await
        .expect("Failed to send second migrate");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Clean up the history entry this test produced
    let order_id = body["order"]["id"].as_str().expect("order id");
    let resp = client
        .delete(format!("{}/order-history/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to delete order history entry");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_delete_cart() {
    let client = client();
    let cart = create_cart(&client, &unique_customer()).await;
    let url = format!("{}/carts/{}", base_url(), cart["id"].as_str().expect("cart id"));

    let resp = client.delete(&url).send().await.expect("Failed to delete cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.delete(&url).send().await.expect("Failed to delete cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_blank_customer_rejected() {
    let resp = client()
        .post(format!("{}/carts", base_url()))
        .json(&json!({"customer": " ", "phone": "555"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
