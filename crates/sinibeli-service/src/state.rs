//! Application state.

use std::sync::Arc;

use sinibeli_store::Store;

use crate::auth::JwtService;
use crate::cache::Cache;
use crate::config::ServiceConfig;
use crate::services::{CompanyService, CustomerService, ProductService, TransactionService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Read-through cache (optional).
    pub cache: Option<Cache>,

    /// Token validation (optional, needs `JWT_SECRET_KEY`).
    pub jwt: Option<JwtService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig, cache: Option<Cache>) -> Self {
        if cache.is_none() {
            tracing::warn!("Cache not configured - reads go straight to the database");
        }

        let jwt = config
            .jwt_secret
            .as_deref()
            .map(|secret| JwtService::new(secret, config.jwt_issuer.clone()));

        match (&jwt, config.auth_required) {
            (Some(_), true) => tracing::info!(issuer = %config.jwt_issuer, "JWT auth enforced"),
            (Some(_), false) => tracing::info!("JWT configured but not enforced"),
            (None, _) => tracing::warn!("JWT not configured - authentication unavailable"),
        }

        Self {
            store,
            config,
            cache,
            jwt,
        }
    }

    /// Check if a cache is configured.
    #[must_use]
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Company operations.
    #[must_use]
    pub fn companies(&self) -> CompanyService<'_> {
        CompanyService::new(self.store.as_ref(), self.cache.as_ref())
    }

    /// Customer operations.
    #[must_use]
    pub fn customers(&self) -> CustomerService<'_> {
        CustomerService::new(self.store.as_ref())
    }

    /// Product operations.
    #[must_use]
    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(self.store.as_ref(), self.cache.as_ref())
    }

    /// Transaction operations and reports.
    #[must_use]
    pub fn transactions(&self) -> TransactionService<'_> {
        TransactionService::new(self.store.as_ref())
    }
}
