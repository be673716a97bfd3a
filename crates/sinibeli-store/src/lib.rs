//! Storage layer for sinibeli.
//!
//! One repository trait per entity translates domain values to and from the
//! database. Repositories hold no business logic, with one exception:
//! [`TransactionRepository::create_transaction`] runs the admission checks from
//! `sinibeli-core` inside the same database transaction as the insert so that
//! two concurrent requests cannot both pass them.
//!
//! Two backends implement every trait:
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, schema under `migrations/`
//! - [`MemoryStore`]: in-process tables for tests
//!
//! # Example
//!
//! ```no_run
//! use sinibeli_store::{CompanyRepository, PgStore};
//!
//! # async fn run() -> sinibeli_store::Result<()> {
//! let store = PgStore::connect("postgres://localhost/sinibeli", 10).await?;
//! store.migrate().await?;
//! let companies = store.list_companies().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use sinibeli_core::{
    ActivityFilter, Company, Customer, CustomerActivity, Product, SummaryFilter, Transaction,
    TransactionSummary,
};

/// Company persistence.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Insert a company.
    ///
    /// # Errors
    ///
    /// `StoreError::AlreadyExists` if the id is taken.
    async fn create_company(&self, company: &Company) -> Result<()>;

    /// Get a company by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_company(&self, id: i64) -> Result<Option<Company>>;

    /// List all companies ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_companies(&self) -> Result<Vec<Company>>;

    /// Overwrite a company's fields.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no company has this id.
    async fn update_company(&self, company: &Company) -> Result<()>;

    /// Delete a company.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no company has this id.
    async fn delete_company(&self, id: i64) -> Result<()>;
}

/// Customer persistence.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// `StoreError::AlreadyExists` if the id is taken.
    async fn create_customer(&self, customer: &Customer) -> Result<()>;

    /// Get a customer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>>;

    /// List all customers ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Overwrite a customer's fields.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no customer has this id.
    async fn update_customer(&self, customer: &Customer) -> Result<()>;

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no customer has this id.
    async fn delete_customer(&self, id: i64) -> Result<()>;
}

/// Product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product.
    ///
    /// # Errors
    ///
    /// `StoreError::AlreadyExists` if the id is taken.
    async fn create_product(&self, product: &Product) -> Result<()>;

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;

    /// List all products ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Overwrite a product's fields.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no product has this id.
    async fn update_product(&self, product: &Product) -> Result<()>;

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no product has this id.
    async fn delete_product(&self, id: i64) -> Result<()>;
}

/// Transaction persistence and reporting.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Admit and insert a validated transaction atomically.
    ///
    /// Checks, in order, that the customer exists, the product exists and
    /// the id is unused, then applies the business rules against the
    /// customer/product history. Returns the row as stored.
    ///
    /// # Errors
    ///
    /// - `StoreError::Rejected` with the failing domain check.
    /// - `StoreError::Database` if the database operation fails.
    async fn create_transaction(&self, transaction: &Transaction) -> Result<Transaction>;

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// List all transactions ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Per company and product aggregates over all transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn transaction_summary(&self) -> Result<Vec<TransactionSummary>>;

    /// One page of filtered aggregates plus the total number of groups.
    ///
    /// The filter is assumed valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn transaction_summary_filtered(
        &self,
        filter: &SummaryFilter,
    ) -> Result<(Vec<TransactionSummary>, i64)>;

    /// One page of ranked customer activity plus the total number of rows.
    ///
    /// The filter is assumed valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn customer_activity(
        &self,
        filter: &ActivityFilter,
    ) -> Result<(Vec<CustomerActivity>, i64)>;
}

/// Every repository a service needs.
pub trait Store:
    CompanyRepository + CustomerRepository + ProductRepository + TransactionRepository
{
}

impl<T> Store for T where
    T: CompanyRepository + CustomerRepository + ProductRepository + TransactionRepository
{
}
