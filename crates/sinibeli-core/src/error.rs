//! Error types for sinibeli.

use std::fmt;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// The entity a [`DomainError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A company.
    Company,
    /// A customer.
    Customer,
    /// A product.
    Product,
    /// A transaction.
    Transaction,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Company => "company",
            Self::Customer => "customer",
            Self::Product => "product",
            Self::Transaction => "transaction",
        })
    }
}

/// Broad classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something the domain rejects.
    BadRequest,
    /// A referenced entity does not exist.
    NotFound,
}

/// Errors raised by domain validation and business rules.
///
/// Every rule has its own variant so callers can match on the exact failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    // ------------------------------------------------------------------
    // Pagination and report filters
    // ------------------------------------------------------------------
    /// Page number below 1.
    #[error("page must be >= 1")]
    InvalidPage,

    /// Page size outside `1..=100`.
    #[error("page_size must be between 1 and 100")]
    InvalidPageSize,

    /// `start_date` after `end_date`.
    #[error("start_date must be before end_date")]
    InvalidDateRange,

    /// `min_amount` not strictly below `max_amount`.
    #[error("min_amount must be less than max_amount")]
    InvalidAmountRange,

    /// Negative `min_amount`.
    #[error("min_amount must be >= 0")]
    NegativeMinAmount,

    /// Negative `max_amount`.
    #[error("max_amount must be >= 0")]
    NegativeMaxAmount,

    /// Non-positive `company_id` filter.
    #[error("company_id must be greater than 0")]
    InvalidCompanyId,

    /// Negative `min_trx` filter.
    #[error("min_trx must be a non-negative integer")]
    InvalidMinTransactionCount,

    // ------------------------------------------------------------------
    // Transaction fields
    // ------------------------------------------------------------------
    /// Amount not strictly positive.
    #[error("amount must be greater than 0")]
    InvalidAmount,

    /// Tax amount negative.
    #[error("tax_amount must be >= 0")]
    InvalidTaxAmount,

    /// Amount with more than two decimal places.
    #[error("amount must have at most 2 decimal places")]
    AmountPrecision,

    /// Tax amount with more than two decimal places.
    #[error("tax_amount must have at most 2 decimal places")]
    TaxAmountPrecision,

    /// Amount does not fit the stored money column.
    #[error("amount exceeds the maximum supported value")]
    AmountOutOfRange,

    /// Tax amount does not fit the stored money column.
    #[error("tax_amount exceeds the maximum supported value")]
    TaxAmountOutOfRange,

    /// Unknown transaction type.
    #[error("transaction_type must be one of: purchase, refund, payment")]
    InvalidTransactionType,

    /// Unknown payment status.
    #[error("payment_status must be one of: pending, completed, failed, cancelled")]
    InvalidPaymentStatus,

    /// Unknown tax type.
    #[error("tax_type must be one of: VAT, GST, SALES_TAX, or empty")]
    InvalidTaxType,

    /// Timestamp later than now.
    #[error("transaction_datetime cannot be in the future")]
    FutureTransactionDate,

    /// Non-positive customer id.
    #[error("customer_id must be greater than 0")]
    InvalidCustomerId,

    /// Non-positive product id.
    #[error("product_id must be greater than 0")]
    InvalidProductId,

    /// Refund carrying more tax than its own amount.
    #[error("tax_amount cannot be greater than refund amount")]
    RefundTaxExceedsAmount,

    // ------------------------------------------------------------------
    // Admission and business rules
    // ------------------------------------------------------------------
    /// Transaction id already taken.
    #[error("transaction ID already exists")]
    DuplicateTransactionId,

    /// Refund larger than what remains refundable.
    #[error("refund amount exceeds original purchase amount")]
    RefundExceedsAvailable,

    /// Refund requested for a pair without any history.
    #[error("insufficient purchase history for refund")]
    InsufficientPurchaseHistory,

    /// Refund amount not strictly positive.
    #[error("refund amount must be greater than 0")]
    RefundAmountNotPositive,

    /// Pair history holds no purchase at all.
    #[error("no purchase found for refund")]
    NoPurchaseForRefund,

    /// Refund more than 30 days after the latest purchase.
    #[error("refund period has expired (30 days limit)")]
    RefundWindowExpired,

    /// Purchase below 1.00.
    #[error("minimum purchase amount is 1.00")]
    PurchaseBelowMinimum,

    /// Purchase above 1,000,000.
    #[error("purchase amount exceeds maximum allowed limit")]
    PurchaseAboveMaximum,

    /// Tax above 50% of the purchase amount.
    #[error("tax amount seems unreasonably high (>50% of purchase amount)")]
    TaxRatioTooHigh,

    /// VAT above 25%.
    #[error("VAT rate exceeds typical maximum (25%)")]
    VatRateTooHigh,

    /// GST above 15%.
    #[error("GST rate exceeds typical maximum (15%)")]
    GstRateTooHigh,

    /// Sales tax above 12%.
    #[error("sales tax rate exceeds typical maximum (12%)")]
    SalesTaxRateTooHigh,

    /// Payment amount not strictly positive.
    #[error("payment amount must be greater than 0")]
    PaymentAmountNotPositive,

    // ------------------------------------------------------------------
    // Entity fields
    // ------------------------------------------------------------------
    /// Required field missing or blank.
    #[error("{field} is required")]
    MissingField {
        /// The field name.
        field: &'static str,
    },

    /// Field longer than allowed.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// The field name.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },

    /// Identifier not strictly positive.
    #[error("id must be greater than 0")]
    InvalidId,

    /// Product service fee below zero.
    #[error("service_fee must be >= 0")]
    NegativeServiceFee,

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------
    /// Entity does not exist.
    #[error("{0} not found")]
    NotFound(Entity),
}

impl DomainError {
    /// Classify the error for status mapping.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::BadRequest,
        }
    }

    /// Whether the error came from parsing or checking transaction fields.
    ///
    /// These are the failures for which the API lists the accepted enum values.
    #[must_use]
    pub fn is_transaction_field_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount
                | Self::InvalidTaxAmount
                | Self::AmountPrecision
                | Self::TaxAmountPrecision
                | Self::AmountOutOfRange
                | Self::TaxAmountOutOfRange
                | Self::InvalidTransactionType
                | Self::InvalidPaymentStatus
                | Self::InvalidTaxType
                | Self::FutureTransactionDate
                | Self::InvalidCustomerId
                | Self::InvalidProductId
        )
    }
}
