use sinibeli_core::{Customer, DomainError, Entity};
use sinibeli_store::Store;

use super::Result;
use crate::error::ServiceError;

/// Customer CRUD. The owning company must exist on create and update.
pub struct CustomerService<'a> {
    store: &'a dyn Store,
}

impl<'a> CustomerService<'a> {
    /// Create a service over a store.
    #[must_use]
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate and insert a customer.
    pub async fn create(&self, customer: Customer) -> Result<Customer> {
        customer.validate()?;
        self.require_company(customer.company_id).await?;
        self.store.create_customer(&customer).await?;

        tracing::info!(
            customer_id = customer.id,
            company_id = customer.company_id,
            "Customer created"
        );
        Ok(customer)
    }

    /// Get a customer.
    pub async fn get(&self, id: i64) -> Result<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::NotFound(Entity::Customer)))
    }

    /// All customers ordered by id.
    pub async fn list(&self) -> Result<Vec<Customer>> {
        Ok(self.store.list_customers().await?)
    }

    /// Replace an existing customer's fields.
    pub async fn update(&self, customer: Customer) -> Result<Customer> {
        customer.validate()?;
        self.get(customer.id).await?;
        self.require_company(customer.company_id).await?;

        self.store
            .update_customer(&customer)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Customer))?;

        tracing::info!(customer_id = customer.id, "Customer updated");
        Ok(customer)
    }

    /// Delete an existing customer.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.get(id).await?;

        self.store
            .delete_customer(id)
            .await
            .map_err(|e| ServiceError::from(e).missing_as(Entity::Customer))?;

        tracing::info!(customer_id = id, "Customer deleted");
        Ok(())
    }

    async fn require_company(&self, company_id: i64) -> Result<()> {
        match self.store.get_company(company_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(Entity::Company).into()),
        }
    }
}
