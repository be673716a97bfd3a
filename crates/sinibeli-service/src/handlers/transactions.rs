//! Transaction and report handlers.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sinibeli_core::{
    end_of_day, start_of_day, ActivityFilter, CustomerActivity, Entity, NewTransaction, PageRequest,
    Pagination, PaymentStatus, SummaryFilter, TaxType, Transaction, TransactionSummary,
    TransactionType,
};

use crate::error::{invalid_id, ApiError};
use crate::state::AppState;

/// Example shown when `transaction_datetime` is malformed.
const DATETIME_EXAMPLE: &str = "2023-12-25T10:30:00Z";

// ============================================================================
// Request / response types
// ============================================================================

/// Create transaction request.
///
/// Money is sent as decimal strings so no precision is lost in JSON.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Caller-chosen id.
    pub id: i64,
    /// Customer making the transaction.
    pub customer_id: i64,
    /// `purchase`, `refund` or `payment`.
    pub transaction_type: String,
    /// Gross amount, e.g. `"100.00"`.
    pub amount: String,
    /// Tax amount, e.g. `"10.00"`.
    pub tax_amount: String,
    /// `VAT`, `GST`, `SALES_TAX` or empty.
    #[serde(default)]
    pub tax_type: Option<String>,
    /// `pending`, `completed`, `failed` or `cancelled`.
    pub payment_status: String,
    /// Product the transaction is recorded against.
    pub product_id: i64,
    /// RFC 3339 timestamp; now if omitted.
    #[serde(default)]
    pub transaction_datetime: Option<String>,
}

impl CreateTransactionRequest {
    fn into_new_transaction(self) -> Result<NewTransaction, ApiError> {
        let amount = Decimal::from_str(self.amount.trim()).map_err(|_| {
            ApiError::bad_request("invalid amount format, must be a valid number")
        })?;
        let tax_amount = Decimal::from_str(self.tax_amount.trim()).map_err(|_| {
            ApiError::bad_request("invalid tax_amount format, must be a valid number")
        })?;

        let transaction_datetime = self
            .transaction_datetime
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| {
                        ApiError::bad_request("invalid transaction_datetime format, use RFC3339")
                            .with_example(DATETIME_EXAMPLE)
                    })
            })
            .transpose()?;

        Ok(NewTransaction {
            id: self.id,
            customer_id: self.customer_id,
            transaction_type: self.transaction_type.parse::<TransactionType>()?,
            amount,
            tax_amount,
            tax_type: TaxType::parse_optional(self.tax_type.as_deref().unwrap_or_default())?,
            payment_status: self.payment_status.parse::<PaymentStatus>()?,
            product_id: self.product_id,
            transaction_datetime,
        })
    }
}

/// Paginated report response.
#[derive(Debug, Serialize)]
pub struct ReportResponse<T, F> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Position of this page.
    pub pagination: Pagination,
    /// The filters the rows were computed with.
    pub applied_filters: F,
}

// ============================================================================
// Query parsing
// ============================================================================

/// Query parameters with empty values treated as absent.
struct Params(HashMap<String, String>);

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Parse a parameter, mapping failure to a 400 built by `err`.
    fn parse<T: FromStr>(
        &self,
        key: &str,
        err: impl FnOnce() -> ApiError,
    ) -> Result<Option<T>, ApiError> {
        self.get(key)
            .map(|v| v.parse::<T>().map_err(|_| err()))
            .transpose()
    }

    fn date(&self, key: &str, example: &str) -> Result<Option<NaiveDate>, ApiError> {
        self.get(key)
            .map(|v| {
                NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                    ApiError::bad_request_with(
                        format!("invalid {key} format"),
                        format!("{key} must be in YYYY-MM-DD format"),
                    )
                    .with_example(example)
                })
            })
            .transpose()
    }
}

fn summary_filter(params: &Params) -> Result<SummaryFilter, ApiError> {
    let page = params.parse("page", || {
        ApiError::bad_request_with("invalid page parameter", "page must be a positive integer >= 1")
    })?;
    let page_size = params.parse("page_size", || {
        ApiError::bad_request_with(
            "invalid page_size parameter",
            "page_size must be between 1 and 100",
        )
    })?;
    let company_id = params.parse("company_id", || {
        ApiError::bad_request_with(
            "invalid company_id parameter",
            "company_id must be a positive integer",
        )
    })?;
    let product_id = params.parse("product_id", || {
        ApiError::bad_request_with(
            "invalid product_id parameter",
            "product_id must be a positive integer",
        )
    })?;
    let min_amount = params.parse("min_amount", || {
        ApiError::bad_request_with(
            "invalid min_amount parameter",
            "min_amount must be a non-negative number",
        )
    })?;
    let max_amount = params.parse("max_amount", || {
        ApiError::bad_request_with(
            "invalid max_amount parameter",
            "max_amount must be a non-negative number",
        )
    })?;

    Ok(SummaryFilter {
        company_id,
        product_id,
        start: params.date("start_date", "2023-01-01")?.map(start_of_day),
        end: params.date("end_date", "2023-12-31")?.map(end_of_day),
        min_amount,
        max_amount,
        page: PageRequest::new(page, page_size),
    })
}

fn activity_filter(params: &Params) -> Result<ActivityFilter, ApiError> {
    let company_id = params.parse("company_id", || ApiError::bad_request("invalid company_id"))?;
    let min_trx_count = params.parse("min_trx", || {
        ApiError::bad_request("invalid min_trx (must be non-negative integer)")
    })?;
    let page = params.parse("page", || ApiError::bad_request("invalid page"))?;
    let page_size = params.parse("page_size", || {
        ApiError::bad_request("page_size must be between 1 and 100")
    })?;

    Ok(ActivityFilter {
        company_id,
        min_trx_count,
        page: PageRequest::new(page, page_size),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a transaction.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::TransactionValidation {
        message: "validation failed".into(),
        details: Some(rejection.body_text()),
    })?;

    let new = body.into_new_transaction()?;
    let transaction = state.transactions().create(new).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Get a transaction by id.
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Transaction>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Transaction))?;
    Ok(Json(state.transactions().get(id).await?))
}

/// List all transactions.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.transactions().list().await?))
}

/// Unfiltered summary per company and product.
pub async fn transaction_summary_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TransactionSummary>>, ApiError> {
    Ok(Json(state.transactions().summary_all().await?))
}

/// Filtered, paginated summary per company and product.
pub async fn transaction_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReportResponse<TransactionSummary, SummaryFilter>>, ApiError> {
    let filter = summary_filter(&Params(params))?;
    let page = state.transactions().summary(&filter).await?;

    Ok(Json(ReportResponse {
        data: page.data,
        pagination: page.pagination,
        applied_filters: filter,
    }))
}

/// Customers ranked by transaction count within each company.
pub async fn customer_activity(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReportResponse<CustomerActivity, ActivityFilter>>, ApiError> {
    let filter = activity_filter(&Params(params))?;
    let page = state.transactions().customer_activity(&filter).await?;

    Ok(Json(ReportResponse {
        data: page.data,
        pagination: page.pagination,
        applied_filters: filter,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn summary_filter_defaults() {
        let filter = summary_filter(&params(&[])).unwrap();
        assert_eq!(filter, SummaryFilter::default());
    }

    #[test]
    fn summary_filter_parses_everything() {
        let filter = summary_filter(&params(&[
            ("page", "2"),
            ("page_size", "25"),
            ("company_id", "3"),
            ("product_id", "9"),
            ("start_date", "2024-01-01"),
            ("end_date", "2024-01-31"),
            ("min_amount", "10.50"),
            ("max_amount", "99"),
        ]))
        .unwrap();

        assert_eq!(filter.page, PageRequest::new(Some(2), Some(25)));
        assert_eq!(filter.company_id, Some(3));
        assert_eq!(filter.product_id, Some(9));
        assert_eq!(
            filter.end.unwrap().to_rfc3339(),
            "2024-01-31T23:59:59.999999+00:00"
        );
        assert_eq!(filter.min_amount, Some(Decimal::new(1050, 2)));
    }

    #[test]
    fn empty_values_are_ignored() {
        let filter = summary_filter(&params(&[("company_id", ""), ("page", " ")])).unwrap();
        assert_eq!(filter.company_id, None);
        assert_eq!(filter.page.page, 1);
    }

    #[test]
    fn bad_date_names_the_parameter() {
        let err = summary_filter(&params(&[("start_date", "01/02/2024")])).unwrap_err();
        match err {
            ApiError::BadRequest {
                message,
                details,
                example,
            } => {
                assert_eq!(message, "invalid start_date format");
                assert_eq!(details.as_deref(), Some("start_date must be in YYYY-MM-DD format"));
                assert_eq!(example.as_deref(), Some("2023-01-01"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn activity_filter_rejects_garbage() {
        assert!(activity_filter(&params(&[("min_trx", "lots")])).is_err());
        assert!(activity_filter(&params(&[("company_id", "x")])).is_err());

        let filter = activity_filter(&params(&[("company_id", "2"), ("min_trx", "3")])).unwrap();
        assert_eq!(filter.company_id, Some(2));
        assert_eq!(filter.min_trx_count, Some(3));
    }

    fn request(amount: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            id: 1,
            customer_id: 5,
            transaction_type: "purchase".into(),
            amount: amount.into(),
            tax_amount: "10.00".into(),
            tax_type: Some("VAT".into()),
            payment_status: "completed".into(),
            product_id: 9,
            transaction_datetime: None,
        }
    }

    #[test]
    fn request_converts() {
        let new = request("100.00").into_new_transaction().unwrap();
        assert_eq!(new.amount, Decimal::new(10000, 2));
        assert_eq!(new.tax_type, Some(TaxType::Vat));
        assert_eq!(new.transaction_type, TransactionType::Purchase);
        assert_eq!(new.payment_status, PaymentStatus::Completed);
        assert_eq!(new.transaction_datetime, None);
    }

    #[test]
    fn request_rejects_bad_amount() {
        let err = request("ten").into_new_transaction().unwrap_err();
        assert_eq!(err.to_string(), "invalid amount format, must be a valid number");
    }

    #[test]
    fn request_rejects_bad_datetime() {
        let mut req = request("100.00");
        req.transaction_datetime = Some("yesterday".into());
        let err = req.into_new_transaction().unwrap_err();
        assert_eq!(err.to_string(), "invalid transaction_datetime format, use RFC3339");
    }

    #[test]
    fn request_rejects_unknown_enum_with_valid_values() {
        let mut req = request("100.00");
        req.transaction_type = "gift".into();
        let err = req.into_new_transaction().unwrap_err();
        assert!(matches!(err, ApiError::TransactionValidation { .. }));
    }
}
