//! Cache-aside layer.
//!
//! [`Cache`] stores JSON-encoded values in a [`CacheBackend`] (Redis in
//! production, [`MemoryBackend`] in tests). The cache is never the source of
//! truth: read failures fall through to the store and write failures are
//! logged and ignored.

mod memory;
mod redis_backend;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ============================================================================
// Keys and TTLs
// ============================================================================

/// How long a product stays cached.
pub const PRODUCT_TTL: Duration = Duration::from_secs(30 * 60);

/// How long a company stays cached.
pub const COMPANY_TTL: Duration = Duration::from_secs(30 * 60);

/// How long the product list stays cached.
pub const PRODUCT_LIST_TTL: Duration = Duration::from_secs(10 * 60);

/// Cache keys.
pub mod keys {
    /// Key for one product.
    #[must_use]
    pub fn product(id: i64) -> String {
        format!("product:{id}")
    }

    /// Key for one company.
    #[must_use]
    pub fn company(id: i64) -> String {
        format!("company:{id}")
    }

    /// Key for the full product list.
    pub const PRODUCT_LIST: &str = "products:list";
}

// ============================================================================
// Backend
// ============================================================================

/// Cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// A value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw string storage with expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a value. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Whether a live value exists.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Read several values, in key order.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;

    /// Write several values with the same expiry.
    async fn set_many(&self, items: Vec<(String, String)>, ttl: Duration)
        -> Result<(), CacheError>;

    /// Check connectivity.
    async fn ping(&self) -> Result<(), CacheError>;
}

// ============================================================================
// Typed cache
// ============================================================================

/// Typed cache over a shared backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Read and decode a value. `Ok(None)` on a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a value.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw, ttl).await
    }

    /// Remove a value.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key).await
    }

    /// Whether a live value exists.
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key).await
    }

    /// Read and decode several values, in key order.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        keys: &[String],
    ) -> Result<Vec<Option<T>>, CacheError> {
        self.backend
            .get_many(keys)
            .await?
            .into_iter()
            .map(|raw| {
                raw.map(|r| serde_json::from_str(&r))
                    .transpose()
                    .map_err(CacheError::from)
            })
            .collect()
    }

    /// Encode and write several values with the same expiry.
    pub async fn set_many<T: Serialize>(
        &self,
        items: &[(String, T)],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let encoded = items
            .iter()
            .map(|(key, value)| Ok((key.clone(), serde_json::to_string(value)?)))
            .collect::<Result<Vec<_>, CacheError>>()?;
        self.backend.set_many(encoded, ttl).await
    }

    /// Check connectivity.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }

    /// Return the cached value, or fetch it and cache the result.
    ///
    /// A failed cache read is treated as a miss. A failed cache write after a
    /// successful fetch is logged and the fetched value is still returned.
    /// Fetch errors are returned as-is and nothing is cached.
    pub async fn get_or_set<T, F, Fut, E>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        match self.get::<T>(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Ok(None) => tracing::debug!(key = %key, "Cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache read failed, loading from store"),
        }

        let value = fetch().await?;

        if let Err(e) = self.set(key, &value, ttl).await {
            tracing::warn!(key = %key, error = %e, "Failed to populate cache");
        }

        Ok(value)
    }

    /// Remove keys, logging failures.
    pub async fn invalidate(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.delete(key).await {
                tracing::warn!(key = %key, error = %e, "Failed to invalidate cache key");
            }
        }
    }
}
