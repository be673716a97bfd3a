//! Product integration tests.

mod common;

use axum::http::StatusCode;
use common::{product_body, TestHarness};
use serde_json::{json, Value};

#[tokio::test]
async fn create_product_returns_stored_fee() {
    let harness = TestHarness::new();

    let response = harness.post("/api/v1/products", &product_body(9)).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 9);
    assert_eq!(body["service_fee"], "2.50");
    assert_eq!(body["service_fee_percentage"], false);
}

#[tokio::test]
async fn create_product_rejects_bad_fee() {
    let harness = TestHarness::new();
    let mut body = product_body(9);
    body["service_fee"] = json!("two fifty");

    let response = harness.post("/api/v1/products", &body).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid service_fee format");
}

#[tokio::test]
async fn create_product_rejects_negative_fee() {
    let harness = TestHarness::new();
    let mut body = product_body(9);
    body["service_fee"] = json!("-1");

    let response = harness.post("/api/v1/products", &body).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "service_fee must be >= 0");
}

#[tokio::test]
async fn create_product_duplicate_conflicts() {
    let harness = TestHarness::new();
    harness.seed_product(9).await;

    harness
        .post("/api/v1/products", &product_body(9))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn product_list_reflects_writes_despite_cache() {
    let harness = TestHarness::new();
    harness.seed_product(1).await;

    // Cache the list, then change it three ways.
    let listed: Vec<Value> = harness.server.get("/api/v1/products").await.json();
    assert_eq!(listed.len(), 1);

    harness.seed_product(2).await;
    let listed: Vec<Value> = harness.server.get("/api/v1/products").await.json();
    assert_eq!(listed.len(), 2);

    harness
        .server
        .put("/api/v1/products/1")
        .json(&json!({
            "product_name": "Premium",
            "service_fee": "1.5",
            "service_fee_percentage": true,
        }))
        .await
        .assert_status_ok();
    let listed: Vec<Value> = harness.server.get("/api/v1/products").await.json();
    assert_eq!(listed[0]["product_name"], "Premium");

    harness
        .server
        .delete("/api/v1/products/2")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let listed: Vec<Value> = harness.server.get("/api/v1/products").await.json();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn get_product_after_update_is_fresh() {
    let harness = TestHarness::new();
    harness.seed_product(9).await;
    harness.server.get("/api/v1/products/9").await.assert_status_ok();

    harness
        .server
        .put("/api/v1/products/9")
        .json(&json!({
            "product_name": "Product 9",
            "service_fee": "3.755",
            "service_fee_percentage": false,
        }))
        .await
        .assert_status_ok();

    let body: Value = harness.server.get("/api/v1/products/9").await.json();
    assert_eq!(body["service_fee"], "3.76");
}

#[tokio::test]
async fn get_product_not_found() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/v1/products/1").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "product not found");
}

#[tokio::test]
async fn delete_missing_product_not_found() {
    let harness = TestHarness::new();

    harness
        .server
        .delete("/api/v1/products/1")
        .await
        .assert_status_not_found();
}
