//! Report rows, filters and pagination.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Page number used when none is given.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Pagination
// ============================================================================

/// A requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query values.
    #[must_use]
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Check page bounds.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidPage`] or [`DomainError::InvalidPageSize`].
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(DomainError::InvalidPage);
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(DomainError::InvalidPageSize);
        }
        Ok(())
    }

    /// Rows to skip. Saturates at `i64::MAX`, so a page far past the end
    /// is simply empty.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Rows to return.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size
    }

    /// Pagination metadata for a result with `total_items` rows.
    #[must_use]
    pub fn paginate(&self, total_items: i64) -> Pagination {
        let mut total_pages = total_items / self.page_size;
        if total_items % self.page_size > 0 {
            total_pages += 1;
        }
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages,
        }
    }

    /// Slice an in-memory result down to this page.
    #[must_use]
    pub fn slice<T: Clone>(&self, rows: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let len = usize::try_from(self.limit()).unwrap_or(0);
        rows.iter().skip(start).take(len).cloned().collect()
    }
}

/// Pagination metadata returned with every paged report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
    /// Rows across all pages.
    pub total_items: i64,
    /// `ceil(total_items / page_size)`.
    pub total_pages: i64,
}

/// One page of rows plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Position of this page.
    pub pagination: Pagination,
}

// ============================================================================
// Transaction summary
// ============================================================================

/// Aggregate of one company's transactions on one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Company id.
    pub id: i64,
    /// Company name.
    pub company_name: String,
    /// Product id.
    pub product_id: i64,
    /// Product name.
    pub product_name: String,
    /// Sum of amounts.
    pub amount: Decimal,
    /// Number of transactions.
    pub count: i64,
    /// Sum of tax amounts.
    pub tax_value: Decimal,
    /// Whether the product fee is a percentage.
    pub service_fee_percentage: bool,
    /// Product fee.
    pub service_fee: Decimal,
    /// Timestamp of the latest transaction.
    pub last_trx_on: DateTime<Utc>,
    /// Id of the latest transaction.
    pub id_last_trx: i64,
    /// Timestamp of the earliest transaction.
    pub first_trx_on: DateTime<Utc>,
    /// Id of the earliest transaction.
    pub id_first_trx: i64,
}

/// Filters for the paginated transaction summary.
///
/// Every bound is inclusive. `end` is usually produced by [`end_of_day`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryFilter {
    /// Only this company.
    pub company_id: Option<i64>,
    /// Only this product.
    pub product_id: Option<i64>,
    /// Earliest transaction timestamp.
    #[serde(rename = "start_date")]
    pub start: Option<DateTime<Utc>>,
    /// Latest transaction timestamp.
    #[serde(rename = "end_date")]
    pub end: Option<DateTime<Utc>>,
    /// Smallest transaction amount.
    pub min_amount: Option<Decimal>,
    /// Largest transaction amount.
    pub max_amount: Option<Decimal>,
    /// Requested page.
    #[serde(skip)]
    pub page: PageRequest,
}

impl SummaryFilter {
    /// Check the filter before it reaches the store.
    ///
    /// # Errors
    ///
    /// Returns the first invalid bound: page, page size, date range, amount
    /// range, negative amounts, then the id filters.
    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(DomainError::InvalidDateRange);
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min >= max {
                return Err(DomainError::InvalidAmountRange);
            }
        }
        if self.min_amount.is_some_and(|m| m < Decimal::ZERO) {
            return Err(DomainError::NegativeMinAmount);
        }
        if self.max_amount.is_some_and(|m| m < Decimal::ZERO) {
            return Err(DomainError::NegativeMaxAmount);
        }
        if self.company_id.is_some_and(|id| id <= 0) {
            return Err(DomainError::InvalidCompanyId);
        }
        if self.product_id.is_some_and(|id| id <= 0) {
            return Err(DomainError::InvalidProductId);
        }
        Ok(())
    }

    /// Whether a transaction with these attributes passes the filter.
    #[must_use]
    pub fn matches(
        &self,
        company_id: i64,
        product_id: i64,
        at: DateTime<Utc>,
        amount: Decimal,
    ) -> bool {
        self.company_id.map_or(true, |c| c == company_id)
            && self.product_id.map_or(true, |p| p == product_id)
            && self.start.map_or(true, |s| at >= s)
            && self.end.map_or(true, |e| at <= e)
            && self.min_amount.map_or(true, |m| amount >= m)
            && self.max_amount.map_or(true, |m| amount <= m)
    }
}

/// Last instant of `date`, used as an inclusive end bound.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc()
}

/// First instant of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// ============================================================================
// Customer activity
// ============================================================================

/// Transaction count for one customer, ranked across the filtered result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerActivity {
    /// 1-based rank before pagination.
    pub row_number: i64,
    /// Company id.
    pub company_id: i64,
    /// Company name.
    pub company_name: String,
    /// Customer id.
    pub customer_id: i64,
    /// First and last name.
    pub full_name: String,
    /// Number of transactions.
    pub count_trx: i64,
}

/// Filters for the customer activity report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityFilter {
    /// Only customers of this company.
    pub company_id: Option<i64>,
    /// Only customers with at least this many transactions.
    #[serde(rename = "min_trx")]
    pub min_trx_count: Option<i64>,
    /// Requested page.
    #[serde(skip)]
    pub page: PageRequest,
}

impl ActivityFilter {
    /// Check the filter before it reaches the store.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;
        if self.company_id.is_some_and(|id| id <= 0) {
            return Err(DomainError::InvalidCompanyId);
        }
        if self.min_trx_count.is_some_and(|n| n < 0) {
            return Err(DomainError::InvalidMinTransactionCount);
        }
        Ok(())
    }
}
