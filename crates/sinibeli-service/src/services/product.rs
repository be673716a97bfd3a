use sinibeli_core::{DomainError, Entity, Product};
use sinibeli_store::Store;

use super::Result;
use crate::cache::{keys, Cache, PRODUCT_LIST_TTL, PRODUCT_TTL};
use crate::error::ServiceError;

/// Product CRUD with read-through caching of single products and the list.
pub struct ProductService<'a> {
    store: &'a dyn Store,
    cache: Option<&'a Cache>,
}

impl<'a> ProductService<'a> {
    /// Create a service over a store and optional cache.
    #[must_use]
    pub fn new(store: &'a dyn Store, cache: Option<&'a Cache>) -> Self {
        Self { store, cache }
    }

    /// Validate and insert a product. Returns the product as stored.
    pub async fn create(&self, product: Product) -> Result<Product> {
        product.validate()?;
        self.store.create_product(&product).await?;
        self.invalidate(None).await;

        tracing::info!(product_id = product.id, "Product created");
        self.load(product.id).await
    }

    /// Get a product, from cache when possible.
    pub async fn get(&self, id: i64) -> Result<Product> {
        match self.cache {
            Some(cache) => {
                cache
                    .get_or_set(&keys::product(id), PRODUCT_TTL, move || self.load(id))
                    .await
            }
            None => self.load(id).await,
        }
    }

    /// All products ordered by id, from cache when possible.
    pub async fn list(&self) -> Result<Vec<Product>> {
        let store = self.store;
        let fetch = move || async move { store.list_products().await.map_err(ServiceError::from) };
        match self.cache {
            Some(cache) => {
                cache
                    .get_or_set(keys::PRODUCT_LIST, PRODUCT_LIST_TTL, fetch)
                    .await
            }
            None => fetch().await,
        }
    }

    /// Replace an existing product's fields. Returns the product as stored.
    pub async fn update(&self, product: Product) -> Result<Product> {
        product.validate()?;
        self.load(product.id).await?;

        self.store
            .update_product(&product)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Product))?;
        self.invalidate(Some(product.id)).await;

        tracing::info!(product_id = product.id, "Product updated");
        self.load(product.id).await
    }

    /// Delete an existing product.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.load(id).await?;

        self.store
            .delete_product(id)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Product))?;
        self.invalidate(Some(id)).await;

        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::NotFound(Entity::Product)))
    }

    /// Drop the list and, if given, one product.
    async fn invalidate(&self, id: Option<i64>) {
        let Some(cache) = self.cache else {
            return;
        };
        match id {
            Some(id) => cache.invalidate(&[keys::PRODUCT_LIST, &keys::product(id)]).await,
            None => cache.invalidate(&[keys::PRODUCT_LIST]).await,
        }
    }
}
