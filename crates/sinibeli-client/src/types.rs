//! Request and response types for the sinibeli client.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sinibeli_core::{Pagination, PaymentStatus, TaxType, TransactionType};

/// Body of `POST /api/v1/transactions`.
///
/// Money serializes as decimal strings.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransaction {
    /// Caller-chosen id.
    pub id: i64,
    /// Customer making the transaction.
    pub customer_id: i64,
    /// Kind of transaction.
    pub transaction_type: TransactionType,
    /// Gross amount.
    pub amount: Decimal,
    /// Tax included in `amount`.
    pub tax_amount: Decimal,
    /// Tax regime, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Product the transaction is recorded against.
    pub product_id: i64,
    /// When it happened; the server uses its clock when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_datetime: Option<DateTime<Utc>>,
}

impl CreateTransaction {
    /// A completed purchase without tax, timestamped by the server.
    #[must_use]
    pub fn purchase(id: i64, customer_id: i64, product_id: i64, amount: Decimal) -> Self {
        Self {
            id,
            customer_id,
            transaction_type: TransactionType::Purchase,
            amount,
            tax_amount: Decimal::ZERO,
            tax_type: None,
            payment_status: PaymentStatus::Completed,
            product_id,
            transaction_datetime: None,
        }
    }

    /// A completed refund, timestamped by the server.
    #[must_use]
    pub fn refund(id: i64, customer_id: i64, product_id: i64, amount: Decimal) -> Self {
        Self {
            transaction_type: TransactionType::Refund,
            ..Self::purchase(id, customer_id, product_id, amount)
        }
    }

    /// Set the tax amount and regime.
    #[must_use]
    pub fn with_tax(mut self, tax_type: TaxType, tax_amount: Decimal) -> Self {
        self.tax_type = Some(tax_type);
        self.tax_amount = tax_amount;
        self
    }

    /// Set an explicit timestamp.
    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.transaction_datetime = Some(at);
        self
    }
}

/// Query for `GET /api/v1/transactions/summary`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryQuery {
    /// 1-based page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Rows per page, 1 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    /// Only this company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    /// Only this product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    /// First day included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last day included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Smallest transaction amount counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    /// Largest transaction amount counted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
}

/// Query for `GET /api/v1/transactions/reports`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ActivityQuery {
    /// Only customers of this company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    /// Drop customers with fewer transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_trx: Option<i64>,
    /// 1-based page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Rows per page, 1 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
}

/// A page of report rows.
#[derive(Debug, Clone, Deserialize)]
pub struct Report<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Position of this page.
    pub pagination: Pagination,
    /// Filters as the server applied them.
    #[serde(default)]
    pub applied_filters: serde_json::Value,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// `ok` when healthy.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}
