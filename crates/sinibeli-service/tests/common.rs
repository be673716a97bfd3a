//! Common test utilities for sinibeli integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use sinibeli_service::{create_router, AppState, Cache, JwtService, MemoryBackend, ServiceConfig};
use sinibeli_store::MemoryStore;

/// Secret used when auth is enabled.
pub const JWT_SECRET: &str = "test-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    /// Token issuer matching the server's configuration.
    pub jwt: JwtService,
}

impl TestHarness {
    /// Create a harness with a fresh store, an in-memory cache and auth off.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig {
            jwt_secret: Some(JWT_SECRET.into()),
            ..ServiceConfig::default()
        })
    }

    /// Create a harness that requires a bearer token on `/api/v1`.
    pub fn with_auth() -> Self {
        Self::with_config(ServiceConfig {
            jwt_secret: Some(JWT_SECRET.into()),
            auth_required: true,
            ..ServiceConfig::default()
        })
    }

    fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(Arc::new(MemoryBackend::new()));
        let jwt = JwtService::new(JWT_SECRET, config.jwt_issuer.clone());

        let state = AppState::new(store.clone(), config, Some(cache));
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store, jwt }
    }

    /// `Authorization` header carrying a valid token.
    pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
        let token = self
            .jwt
            .issue(1, "tester@example.com", "tester")
            .expect("Failed to issue token");
        bearer(&token)
    }

    /// POST a JSON body and return the response.
    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.server.post(path).json(body).await
    }

    /// Create a company with a generated name.
    pub async fn seed_company(&self, id: i64) {
        self.post("/api/v1/companies", &company_body(id))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Create a customer of `company_id`.
    pub async fn seed_customer(&self, id: i64, company_id: i64) {
        self.post("/api/v1/customers", &customer_body(id, company_id))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Create a flat-fee product.
    pub async fn seed_product(&self, id: i64) {
        self.post("/api/v1/products", &product_body(id))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Create a transaction and return the response.
    pub async fn create_transaction(&self, body: &Value) -> TestResponse {
        self.post("/api/v1/transactions", body).await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// `Authorization: Bearer <token>`.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value"),
    )
}

pub fn company_body(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Company {id}"),
        "type": "retail",
        "address": "1 Main St",
        "city": "Jakarta",
    })
}

pub fn customer_body(id: i64, company_id: i64) -> Value {
    json!({
        "id": id,
        "first_name": "Customer",
        "last_name": format!("{id}"),
        "email": format!("c{id}@example.com"),
        "company_id": company_id,
    })
}

pub fn product_body(id: i64) -> Value {
    json!({
        "id": id,
        "product_name": format!("Product {id}"),
        "service_fee": "2.50",
        "service_fee_percentage": false,
    })
}

/// A completed VAT purchase.
pub fn purchase(id: i64, customer_id: i64, product_id: i64, amount: &str, tax: &str) -> Value {
    json!({
        "id": id,
        "customer_id": customer_id,
        "transaction_type": "purchase",
        "amount": amount,
        "tax_amount": tax,
        "tax_type": "VAT",
        "payment_status": "completed",
        "product_id": product_id,
    })
}

/// A completed refund with no tax.
pub fn refund(id: i64, customer_id: i64, product_id: i64, amount: &str) -> Value {
    json!({
        "id": id,
        "customer_id": customer_id,
        "transaction_type": "refund",
        "amount": amount,
        "tax_amount": "0",
        "payment_status": "completed",
        "product_id": product_id,
    })
}
