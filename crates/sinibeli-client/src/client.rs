//! Sinibeli HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use sinibeli_core::{CustomerActivity, Product, Transaction, TransactionSummary};

use crate::error::ClientError;
use crate::types::{
    ActivityQuery, ApiErrorResponse, CreateTransaction, HealthResponse, Report, SummaryQuery,
};

/// Prefix of every versioned endpoint.
const API_PREFIX: &str = "/api/v1";

/// Sinibeli API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SinibeliClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SinibeliClient {
    /// Create a client with default options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] for a base URL that is not
    /// `http(s)://`, or [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Same as [`SinibeliClient::new`].
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: options.token,
        })
    }

    /// Send `Authorization: Bearer <token>` on API calls.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Record a transaction.
    ///
    /// # Errors
    ///
    /// Validation and business rule failures come back as
    /// [`ClientError::Api`] with status 400; a missing customer or product
    /// as [`ClientError::NotFound`].
    pub async fn create_transaction(
        &self,
        request: &CreateTransaction,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .request(Method::POST, "/transactions")
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no such transaction exists.
    pub async fn get_transaction(&self, id: i64) -> Result<Transaction, ClientError> {
        let response = self
            .request(Method::GET, &format!("/transactions/{id}"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch every transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        let response = self.request(Method::GET, "/transactions").send().await?;
        Self::handle_response(response).await
    }

    /// Fetch one page of per company and product aggregates.
    ///
    /// # Errors
    ///
    /// Invalid filters come back as [`ClientError::Api`] with status 400.
    pub async fn transaction_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<Report<TransactionSummary>, ClientError> {
        let response = self
            .request(Method::GET, "/transactions/summary")
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch one page of the customer activity ranking.
    ///
    /// # Errors
    ///
    /// Invalid filters come back as [`ClientError::Api`] with status 400.
    pub async fn customer_activity(
        &self,
        query: &ActivityQuery,
    ) -> Result<Report<CustomerActivity>, ClientError> {
        let response = self
            .request(Method::GET, "/transactions/reports")
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no such product exists.
    pub async fn get_product(&self, id: i64) -> Result<Product, ClientError> {
        let response = self
            .request(Method::GET, &format!("/products/{id}"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let response = self.request(Method::GET, "/products").send().await?;
        Self::handle_response(response).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        tracing::debug!(method = %method, url = %url, "Sending request");

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Decode a success body or map the error body to a [`ClientError`].
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let (message, details) = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => (api_error.error, api_error.details),
            Err(_) => (format!("HTTP {status}"), None),
        };
        tracing::debug!(status = status.as_u16(), error = %message, "API returned an error");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Bearer token for authenticated deployments.
    pub token: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            token: None,
        }
    }
}
