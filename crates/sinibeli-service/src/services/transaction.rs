use chrono::Utc;

use sinibeli_core::{
    ActivityFilter, CustomerActivity, DomainError, Entity, NewTransaction, Page, SummaryFilter,
    Transaction, TransactionSummary,
};
use sinibeli_store::Store;

use super::Result;
use crate::error::ServiceError;

/// Transaction creation and reporting.
pub struct TransactionService<'a> {
    store: &'a dyn Store,
}

impl<'a> TransactionService<'a> {
    /// Create a service over a store.
    #[must_use]
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate, admit and record a transaction.
    ///
    /// Field validation runs here; the existence, duplicate and business
    /// rule checks run inside the store so they are atomic with the insert.
    pub async fn create(&self, new: NewTransaction) -> Result<Transaction> {
        let transaction = new.into_transaction(Utc::now())?;
        let stored = self.store.create_transaction(&transaction).await?;

        tracing::info!(
            transaction_id = stored.id,
            customer_id = stored.customer_id,
            product_id = stored.product_id,
            transaction_type = %stored.transaction_type,
            amount = %stored.amount,
            "Transaction created"
        );
        Ok(stored)
    }

    /// Get a transaction.
    pub async fn get(&self, id: i64) -> Result<Transaction> {
        self.store
            .get_transaction(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::NotFound(Entity::Transaction)))
    }

    /// All transactions ordered by id.
    pub async fn list(&self) -> Result<Vec<Transaction>> {
        Ok(self.store.list_transactions().await?)
    }

    /// Aggregates per company and product over every transaction.
    pub async fn summary_all(&self) -> Result<Vec<TransactionSummary>> {
        Ok(self.store.transaction_summary().await?)
    }

    /// One page of filtered aggregates.
    pub async fn summary(&self, filter: &SummaryFilter) -> Result<Page<TransactionSummary>> {
        filter.validate()?;

        let (data, total) = self.store.transaction_summary_filtered(filter).await?;
        tracing::debug!(groups = total, page = filter.page.page, "Transaction summary computed");

        Ok(Page {
            data,
            pagination: filter.page.paginate(total),
        })
    }

    /// One page of the customer activity ranking.
    pub async fn customer_activity(&self, filter: &ActivityFilter) -> Result<Page<CustomerActivity>> {
        filter.validate()?;

        let (data, total) = self.store.customer_activity(filter).await?;
        tracing::debug!(rows = total, page = filter.page.page, "Customer activity computed");

        Ok(Page {
            data,
            pagination: filter.page.paginate(total),
        })
    }
}
