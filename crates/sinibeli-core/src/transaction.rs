//! Transaction types and field validation.
//!
//! A transaction records a purchase, refund or payment made by a customer
//! against a product. Field-level checks live here; checks that depend on
//! stored history live in [`crate::rules`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

// ============================================================================
// Enumerations
// ============================================================================

/// Decimal places kept for money columns.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a money column, `NUMERIC(15, 2)`.
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_316_134_912, 2_328, 0, false, 0);

/// Accepted `transaction_type` values, in display order.
pub const VALID_TRANSACTION_TYPES: [&str; 3] = ["purchase", "refund", "payment"];

/// Accepted `payment_status` values, in display order.
pub const VALID_PAYMENT_STATUSES: [&str; 4] = ["pending", "completed", "failed", "cancelled"];

/// Accepted `tax_type` values. The empty string means no tax type.
pub const VALID_TAX_TYPES: [&str; 4] = ["VAT", "GST", "SALES_TAX", ""];

/// Kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Customer bought the product.
    Purchase,

    /// Money returned to the customer for an earlier purchase.
    Refund,

    /// Customer paid an outstanding amount.
    Payment,
}

impl TransactionType {
    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "purchase" => Ok(Self::Purchase),
            "refund" => Ok(Self::Refund),
            "payment" => Ok(Self::Payment),
            _ => Err(DomainError::InvalidTransactionType),
        }
    }
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting settlement.
    Pending,

    /// Settled.
    Completed,

    /// Settlement failed.
    Failed,

    /// Cancelled before settlement.
    Cancelled,
}

impl PaymentStatus {
    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus),
        }
    }
}

/// Tax regime applied to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxType {
    /// Value added tax, capped at 25% of a purchase.
    Vat,

    /// Goods and services tax, capped at 15% of a purchase.
    Gst,

    /// Sales tax, capped at 12% of a purchase.
    SalesTax,
}

impl TaxType {
    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vat => "VAT",
            Self::Gst => "GST",
            Self::SalesTax => "SALES_TAX",
        }
    }

    /// Parse an optional tax type where the empty string means none.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaxType`] for any other unknown value.
    pub fn parse_optional(s: &str) -> Result<Option<Self>> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VAT" => Ok(Self::Vat),
            "GST" => Ok(Self::Gst),
            "SALES_TAX" => Ok(Self::SalesTax),
            _ => Err(DomainError::InvalidTaxType),
        }
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied unique identifier.
    pub id: i64,

    /// Customer making the transaction.
    pub customer_id: i64,

    /// Kind of transaction.
    pub transaction_type: TransactionType,

    /// Gross amount.
    pub amount: Decimal,

    /// When the transaction happened.
    pub transaction_datetime: DateTime<Utc>,

    /// Tax included in `amount`.
    pub tax_amount: Decimal,

    /// Tax regime, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,

    /// Settlement state.
    pub payment_status: PaymentStatus,

    /// Product the transaction is recorded against.
    pub product_id: i64,
}

impl Transaction {
    /// Check field-level constraints against the current time.
    ///
    /// Enum membership is guaranteed by the types, so this covers the
    /// references, amounts and timestamp.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in the order
    /// customer id, product id, amount, tax amount, timestamp, refund tax.
    /// Amounts must carry at most two significant decimal places and stay
    /// below [`MONEY_LIMIT`].
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.customer_id <= 0 {
            return Err(DomainError::InvalidCustomerId);
        }
        if self.product_id <= 0 {
            return Err(DomainError::InvalidProductId);
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount);
        }
        if exceeds_scale(self.amount) {
            return Err(DomainError::AmountPrecision);
        }
        if self.amount >= MONEY_LIMIT {
            return Err(DomainError::AmountOutOfRange);
        }
        if self.tax_amount < Decimal::ZERO {
            return Err(DomainError::InvalidTaxAmount);
        }
        if exceeds_scale(self.tax_amount) {
            return Err(DomainError::TaxAmountPrecision);
        }
        if self.tax_amount >= MONEY_LIMIT {
            return Err(DomainError::TaxAmountOutOfRange);
        }
        if self.transaction_datetime > now {
            return Err(DomainError::FutureTransactionDate);
        }
        if self.transaction_type == TransactionType::Refund && self.tax_amount > self.amount {
            return Err(DomainError::RefundTaxExceedsAmount);
        }
        Ok(())
    }
}

/// Trailing zeros do not count, so `1.500` is accepted.
fn exceeds_scale(value: Decimal) -> bool {
    value.normalize().scale() > MONEY_SCALE
}

/// A transaction as submitted, before the timestamp is defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Caller-supplied unique identifier.
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
    pub tax_type: Option<TaxType>,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Product the transaction is recorded against.
    pub product_id: i64,
    /// When the transaction happened; `None` means now.
    pub transaction_datetime: Option<DateTime<Utc>>,
}

impl NewTransaction {
    /// Fill in the timestamp and validate the result.
    ///
    /// # Errors
    ///
    /// Returns the first field-level violation, see [`Transaction::validate`].
    pub fn into_transaction(self, now: DateTime<Utc>) -> Result<Transaction> {
        let trx = Transaction {
            id: self.id,
            customer_id: self.customer_id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            transaction_datetime: self.transaction_datetime.unwrap_or(now),
            tax_amount: self.tax_amount,
            tax_type: self.tax_type,
            payment_status: self.payment_status,
            product_id: self.product_id,
        };
        trx.validate(now)?;
        Ok(trx)
    }
}
