use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use sinibeli_core::{
    admit, ActivityFilter, AdmissionContext, CustomerActivity, DomainError, SummaryFilter,
    TaxType, Transaction, TransactionSummary, TransactionType,
};

use super::PgStore;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::TransactionRepository;

const TRANSACTION_COLUMNS: &str = "id, customer_id, transaction_type, amount, \
     transaction_datetime, tax_amount, tax_type, payment_status, product_id";

/// Aggregates per company and product. The WHERE clause is appended by the
/// caller before `SUMMARY_GROUPING`.
const SUMMARY_SELECT: &str = "SELECT \
        c.id, \
        c.name AS company_name, \
        p.id AS product_id, \
        p.product_name, \
        COALESCE(SUM(t.amount), 0) AS amount, \
        COUNT(t.id) AS count, \
        COALESCE(SUM(t.tax_amount), 0) AS tax_value, \
        p.service_fee_percentage, \
        p.service_fee, \
        MAX(t.transaction_datetime) AS last_trx_on, \
        (ARRAY_AGG(t.id ORDER BY t.transaction_datetime DESC, t.id DESC))[1] AS id_last_trx, \
        MIN(t.transaction_datetime) AS first_trx_on, \
        (ARRAY_AGG(t.id ORDER BY t.transaction_datetime ASC, t.id ASC))[1] AS id_first_trx \
    FROM company c \
    INNER JOIN customer cu ON c.id = cu.company \
    INNER JOIN transaction t ON cu.id = t.customer_id \
    INNER JOIN product p ON t.product_id = p.id \
    WHERE 1=1";

const SUMMARY_GROUPING: &str = " GROUP BY c.id, c.name, p.id, p.product_name, \
     p.service_fee_percentage, p.service_fee \
     ORDER BY c.id, p.id";

// ============================================================================
// Rows
// ============================================================================

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    customer_id: i64,
    transaction_type: String,
    amount: Decimal,
    transaction_datetime: DateTime<Utc>,
    tax_amount: Decimal,
    tax_type: Option<String>,
    payment_status: String,
    product_id: i64,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let corrupt = |e: DomainError| {
            StoreError::Serialization(format!("transaction {}: {e}", row.id))
        };
        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            transaction_type: row.transaction_type.parse().map_err(corrupt)?,
            amount: row.amount,
            transaction_datetime: row.transaction_datetime,
            tax_amount: row.tax_amount,
            tax_type: TaxType::parse_optional(row.tax_type.as_deref().unwrap_or_default())
                .map_err(corrupt)?,
            payment_status: row.payment_status.parse().map_err(corrupt)?,
            product_id: row.product_id,
        })
    }
}

fn into_transactions(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    company_name: String,
    product_id: i64,
    product_name: String,
    amount: Decimal,
    count: i64,
    tax_value: Decimal,
    service_fee_percentage: bool,
    service_fee: Decimal,
    last_trx_on: DateTime<Utc>,
    id_last_trx: i64,
    first_trx_on: DateTime<Utc>,
    id_first_trx: i64,
}

impl From<SummaryRow> for TransactionSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            company_name: row.company_name,
            product_id: row.product_id,
            product_name: row.product_name,
            amount: row.amount,
            count: row.count,
            tax_value: row.tax_value,
            service_fee_percentage: row.service_fee_percentage,
            service_fee: row.service_fee,
            last_trx_on: row.last_trx_on,
            id_last_trx: row.id_last_trx,
            first_trx_on: row.first_trx_on,
            id_first_trx: row.id_first_trx,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    row_number: i64,
    company_id: i64,
    company_name: String,
    customer_id: i64,
    full_name: String,
    count_trx: i64,
}

impl From<ActivityRow> for CustomerActivity {
    fn from(row: ActivityRow) -> Self {
        Self {
            row_number: row.row_number,
            company_id: row.company_id,
            company_name: row.company_name,
            customer_id: row.customer_id,
            full_name: row.full_name,
            count_trx: row.count_trx,
        }
    }
}

// ============================================================================
// Query builders
// ============================================================================

fn push_summary_query(qb: &mut QueryBuilder<'_, Postgres>, filter: &SummaryFilter) {
    qb.push(SUMMARY_SELECT);
    if let Some(company_id) = filter.company_id {
        qb.push(" AND c.id = ").push_bind(company_id);
    }
    if let Some(product_id) = filter.product_id {
        qb.push(" AND p.id = ").push_bind(product_id);
    }
    if let Some(start) = filter.start {
        qb.push(" AND t.transaction_datetime >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        qb.push(" AND t.transaction_datetime <= ").push_bind(end);
    }
    if let Some(min) = filter.min_amount {
        qb.push(" AND t.amount >= ").push_bind(min);
    }
    if let Some(max) = filter.max_amount {
        qb.push(" AND t.amount <= ").push_bind(max);
    }
    qb.push(SUMMARY_GROUPING);
}

fn push_activity_query(qb: &mut QueryBuilder<'_, Postgres>, filter: &ActivityFilter) {
    qb.push(
        "WITH grouped AS ( \
            SELECT \
                c.id AS company_id, \
                c.name AS company_name, \
                cu.id AS customer_id, \
                CONCAT(cu.first_name, ' ', cu.last_name) AS full_name, \
                COUNT(t.id) AS count_trx \
            FROM company c \
            INNER JOIN customer cu ON c.id = cu.company \
            INNER JOIN transaction t ON cu.id = t.customer_id \
            WHERE 1=1",
    );
    if let Some(company_id) = filter.company_id {
        qb.push(" AND c.id = ").push_bind(company_id);
    }
    qb.push(" GROUP BY c.id, c.name, cu.id, cu.first_name, cu.last_name");
    if let Some(min) = filter.min_trx_count {
        qb.push(" HAVING COUNT(t.id) >= ").push_bind(min);
    }
    qb.push(
        ") \
        SELECT \
            ROW_NUMBER() OVER (ORDER BY company_id, count_trx DESC, customer_id) AS row_number, \
            company_id, company_name, customer_id, full_name, count_trx \
        FROM grouped \
        ORDER BY row_number",
    );
}

// ============================================================================
// Repository
// ============================================================================

#[async_trait]
impl TransactionRepository for PgStore {
    async fn create_transaction(&self, trx: &Transaction) -> Result<Transaction> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::database("failed to begin transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::database("failed to set isolation level", e))?;

        let customer_exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM customer WHERE id = $1 FOR UPDATE",
        )
        .bind(trx.customer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StoreError::database("failed to lock customer", e))?
        .is_some();

        let product_exists =
            sqlx::query_scalar::<_, i64>("SELECT id FROM product WHERE id = $1 FOR SHARE")
                .bind(trx.product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| StoreError::database("failed to lock product", e))?
                .is_some();

        let duplicate = sqlx::query_scalar::<_, i64>("SELECT id FROM transaction WHERE id = $1")
            .bind(trx.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::database("failed to check transaction id", e))?
            .is_some();

        let history = if trx.transaction_type == TransactionType::Refund
            && customer_exists
            && product_exists
            && !duplicate
        {
            let rows = sqlx::query_as::<_, TransactionRow>(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transaction \
                 WHERE customer_id = $1 AND product_id = $2"
            ))
            .bind(trx.customer_id)
            .bind(trx.product_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| StoreError::database("failed to load transaction history", e))?;
            into_transactions(rows)?
        } else {
            Vec::new()
        };

        admit(
            trx,
            &AdmissionContext {
                customer_exists,
                product_exists,
                duplicate,
                history,
            },
        )?;

        let stored = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transaction ({TRANSACTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(trx.id)
        .bind(trx.customer_id)
        .bind(trx.transaction_type.as_str())
        .bind(trx.amount)
        .bind(trx.transaction_datetime)
        .bind(trx.tax_amount)
        .bind(trx.tax_type.map(|t| t.as_str()))
        .bind(trx.payment_status.as_str())
        .bind(trx.product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Rejected(DomainError::DuplicateTransactionId)
            } else {
                StoreError::database("failed to create transaction", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| StoreError::database("failed to commit transaction", e))?;

        tracing::debug!(transaction_id = trx.id, "Transaction row inserted");

        Transaction::try_from(stored)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transaction WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StoreError::database("failed to get transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transaction ORDER BY id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(|e| StoreError::database("failed to list transactions", e))?;

        into_transactions(rows)
    }

    async fn transaction_summary(&self) -> Result<Vec<TransactionSummary>> {
        let mut qb = QueryBuilder::new("");
        push_summary_query(&mut qb, &SummaryFilter::default());

        let rows = qb
            .build_query_as::<SummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to query transaction summary", e))?;

        Ok(rows.into_iter().map(TransactionSummary::from).collect())
    }

    async fn transaction_summary_filtered(
        &self,
        filter: &SummaryFilter,
    ) -> Result<(Vec<TransactionSummary>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM (");
        push_summary_query(&mut count, filter);
        count.push(") AS total");

        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to count total rows", e))?;

        let mut page = QueryBuilder::new("");
        push_summary_query(&mut page, filter);
        page.push(" LIMIT ")
            .push_bind(filter.page.limit())
            .push(" OFFSET ")
            .push_bind(filter.page.offset());

        let rows = page
            .build_query_as::<SummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to query transaction summary", e))?;

        tracing::debug!(total, rows = rows.len(), "Transaction summary page loaded");

        Ok((rows.into_iter().map(TransactionSummary::from).collect(), total))
    }

    async fn customer_activity(
        &self,
        filter: &ActivityFilter,
    ) -> Result<(Vec<CustomerActivity>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM (");
        push_activity_query(&mut count, filter);
        count.push(") AS total");

        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to count total rows", e))?;

        let mut page = QueryBuilder::new("");
        push_activity_query(&mut page, filter);
        page.push(" LIMIT ")
            .push_bind(filter.page.limit())
            .push(" OFFSET ")
            .push_bind(filter.page.offset());

        let rows = page
            .build_query_as::<ActivityRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to query customer activity", e))?;

        Ok((rows.into_iter().map(CustomerActivity::from).collect(), total))
    }
}
