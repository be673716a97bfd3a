//! In-memory storage implementation.
//!
//! Mirrors `PgStore` closely enough to back the service test suite: the same
//! inner joins, grouping, ordering and two-decimal money columns.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::RwLock;

use sinibeli_core::{
    admit, ActivityFilter, AdmissionContext, Company, Customer, CustomerActivity, Entity,
    Product, SummaryFilter, Transaction, TransactionSummary, TransactionType,
};

use crate::error::{Result, StoreError};
use crate::{CompanyRepository, CustomerRepository, ProductRepository, TransactionRepository};

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<i64, Company>,
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    transactions: BTreeMap<i64, Transaction>,
}

impl Tables {
    fn pair_history(&self, customer_id: i64, product_id: i64) -> Vec<Transaction> {
        self.transactions
            .values()
            .filter(|t| t.customer_id == customer_id && t.product_id == product_id)
            .cloned()
            .collect()
    }

    /// Transactions joined to their customer's company and their product.
    /// Rows whose customer, company or product is missing are dropped.
    fn joined(&self) -> impl Iterator<Item = (&Transaction, &Company, &Customer, &Product)> {
        self.transactions.values().filter_map(|t| {
            let customer = self.customers.get(&t.customer_id)?;
            let company = self.companies.get(&customer.company_id)?;
            let product = self.products.get(&t.product_id)?;
            Some((t, company, customer, product))
        })
    }

    fn summarize(&self, filter: &SummaryFilter) -> Vec<TransactionSummary> {
        let mut groups: BTreeMap<(i64, i64), TransactionSummary> = BTreeMap::new();

        for (t, company, _, product) in self.joined() {
            if !filter.matches(company.id, product.id, t.transaction_datetime, t.amount) {
                continue;
            }
            let key = (company.id, product.id);
            let entry = groups.entry(key).or_insert_with(|| TransactionSummary {
                id: company.id,
                company_name: company.name.clone(),
                product_id: product.id,
                product_name: product.product_name.clone(),
                amount: Decimal::ZERO,
                count: 0,
                tax_value: Decimal::ZERO,
                service_fee_percentage: product.service_fee_percentage,
                service_fee: product.service_fee,
                last_trx_on: t.transaction_datetime,
                id_last_trx: t.id,
                first_trx_on: t.transaction_datetime,
                id_first_trx: t.id,
            });

            entry.amount += t.amount;
            entry.tax_value += t.tax_amount;
            entry.count += 1;
            if is_after(t.transaction_datetime, t.id, entry.last_trx_on, entry.id_last_trx) {
                entry.last_trx_on = t.transaction_datetime;
                entry.id_last_trx = t.id;
            }
            if is_after(entry.first_trx_on, entry.id_first_trx, t.transaction_datetime, t.id) {
                entry.first_trx_on = t.transaction_datetime;
                entry.id_first_trx = t.id;
            }
        }

        groups.into_values().collect()
    }

    fn rank_activity(&self, filter: &ActivityFilter) -> Vec<CustomerActivity> {
        let mut counts: HashMap<(i64, i64), CustomerActivity> = HashMap::new();

        for (_, company, customer, _) in self.joined() {
            if filter.company_id.is_some_and(|id| id != company.id) {
                continue;
            }
            counts
                .entry((company.id, customer.id))
                .or_insert_with(|| CustomerActivity {
                    row_number: 0,
                    company_id: company.id,
                    company_name: company.name.clone(),
                    customer_id: customer.id,
                    full_name: customer.full_name(),
                    count_trx: 0,
                })
                .count_trx += 1;
        }

        let mut rows: Vec<CustomerActivity> = counts
            .into_values()
            .filter(|row| filter.min_trx_count.map_or(true, |min| row.count_trx >= min))
            .collect();

        rows.sort_by(|a, b| {
            a.company_id
                .cmp(&b.company_id)
                .then(b.count_trx.cmp(&a.count_trx))
                .then(a.customer_id.cmp(&b.customer_id))
        });

        for (row, n) in rows.iter_mut().zip(1..) {
            row.row_number = n;
        }
        rows
    }
}

/// Order by timestamp, then id.
fn is_after(at: DateTime<Utc>, id: i64, other_at: DateTime<Utc>, other_id: i64) -> bool {
    (at, id) > (other_at, other_id)
}

/// Round and pad to the two decimals of a `NUMERIC(15,2)` column.
fn money(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

fn total_rows(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn create_company(&self, company: &Company) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.companies.contains_key(&company.id) {
            return Err(StoreError::AlreadyExists {
                entity: Entity::Company,
                id: company.id,
            });
        }
        tables.companies.insert(company.id, company.clone());
        Ok(())
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> Result<Vec<Company>> {
        Ok(self.tables.read().await.companies.values().cloned().collect())
    }

    async fn update_company(&self, company: &Company) -> Result<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .companies
            .get_mut(&company.id)
            .ok_or(StoreError::NotFound)?;
        *slot = company.clone();
        Ok(())
    }

    async fn delete_company(&self, id: i64) -> Result<()> {
        self.tables
            .write()
            .await
            .companies
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.customers.contains_key(&customer.id) {
            return Err(StoreError::AlreadyExists {
                entity: Entity::Customer,
                id: customer.id,
            });
        }
        tables.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .customers
            .get_mut(&customer.id)
            .ok_or(StoreError::NotFound)?;
        *slot = customer.clone();
        Ok(())
    }

    async fn delete_customer(&self, id: i64) -> Result<()> {
        self.tables
            .write()
            .await
            .customers
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(&self, product: &Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.products.contains_key(&product.id) {
            return Err(StoreError::AlreadyExists {
                entity: Entity::Product,
                id: product.id,
            });
        }
        let mut stored = product.clone();
        stored.service_fee = money(stored.service_fee);
        tables.products.insert(product.id, stored);
        Ok(())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .products
            .get_mut(&product.id)
            .ok_or(StoreError::NotFound)?;
        *slot = product.clone();
        slot.service_fee = money(slot.service_fee);
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> Result<()> {
        self.tables
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create_transaction(&self, transaction: &Transaction) -> Result<Transaction> {
        // Held for the whole admission so checks and insert are atomic.
        let mut tables = self.tables.write().await;

        let ctx = AdmissionContext {
            customer_exists: tables.customers.contains_key(&transaction.customer_id),
            product_exists: tables.products.contains_key(&transaction.product_id),
            duplicate: tables.transactions.contains_key(&transaction.id),
            history: if transaction.transaction_type == TransactionType::Refund {
                tables.pair_history(transaction.customer_id, transaction.product_id)
            } else {
                Vec::new()
            },
        };
        admit(transaction, &ctx)?;

        let mut stored = transaction.clone();
        stored.amount = money(stored.amount);
        stored.tax_amount = money(stored.tax_amount);
        tables.transactions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.tables.read().await.transactions.get(&id).cloned())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self
            .tables
            .read()
            .await
            .transactions
            .values()
            .cloned()
            .collect())
    }

    async fn transaction_summary(&self) -> Result<Vec<TransactionSummary>> {
        Ok(self
            .tables
            .read()
            .await
            .summarize(&SummaryFilter::default()))
    }

    async fn transaction_summary_filtered(
        &self,
        filter: &SummaryFilter,
    ) -> Result<(Vec<TransactionSummary>, i64)> {
        let all = self.tables.read().await.summarize(filter);
        Ok((filter.page.slice(&all), total_rows(all.len())))
    }

    async fn customer_activity(
        &self,
        filter: &ActivityFilter,
    ) -> Result<(Vec<CustomerActivity>, i64)> {
        let all = self.tables.read().await.rank_activity(filter);
        Ok((filter.page.slice(&all), total_rows(all.len())))
    }
}
