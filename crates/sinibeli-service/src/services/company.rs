use sinibeli_core::{Company, DomainError, Entity};
use sinibeli_store::Store;

use super::Result;
use crate::cache::{keys, Cache, COMPANY_TTL};
use crate::error::ServiceError;

/// Company CRUD with read-through caching of single companies.
pub struct CompanyService<'a> {
    store: &'a dyn Store,
    cache: Option<&'a Cache>,
}

impl<'a> CompanyService<'a> {
    /// Create a service over a store and optional cache.
    #[must_use]
    pub fn new(store: &'a dyn Store, cache: Option<&'a Cache>) -> Self {
        Self { store, cache }
    }

    /// Validate and insert a company.
    pub async fn create(&self, company: Company) -> Result<Company> {
        company.validate()?;
        self.store.create_company(&company).await?;

        tracing::info!(company_id = company.id, "Company created");
        Ok(company)
    }

    /// Get a company, from cache when possible.
    pub async fn get(&self, id: i64) -> Result<Company> {
        match self.cache {
            Some(cache) => {
                cache
                    .get_or_set(&keys::company(id), COMPANY_TTL, move || self.load(id))
                    .await
            }
            None => self.load(id).await,
        }
    }

    /// All companies ordered by id.
    pub async fn list(&self) -> Result<Vec<Company>> {
        Ok(self.store.list_companies().await?)
    }

    /// Replace an existing company's fields.
    pub async fn update(&self, company: Company) -> Result<Company> {
        company.validate()?;
        self.load(company.id).await?;

        self.store
            .update_company(&company)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Company))?;
        self.invalidate(company.id).await;

        tracing::info!(company_id = company.id, "Company updated");
        Ok(company)
    }

    /// Delete an existing company.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.load(id).await?;

        self.store
            .delete_company(id)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Company))?;
        self.invalidate(id).await;

        tracing::info!(company_id = id, "Company deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Company> {
        self.store
            .get_company(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::NotFound(Entity::Company)))
    }

    async fn invalidate(&self, id: i64) {
        if let Some(cache) = self.cache {
            cache.invalidate(&[&keys::company(id)]).await;
        }
    }
}
