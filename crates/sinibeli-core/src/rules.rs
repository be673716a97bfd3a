//! Business rules applied when admitting a transaction.
//!
//! Rules are pure: callers load the customer/product pair's history and pass
//! it in. The store runs [`admit`] inside the same database transaction as
//! the insert.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::error::{DomainError, Entity, Result};
use crate::transaction::{TaxType, Transaction, TransactionType};

/// Days after the latest purchase during which a refund is accepted.
pub const REFUND_WINDOW_DAYS: i64 = 30;

/// Smallest accepted purchase amount (1.00).
pub const MIN_PURCHASE_AMOUNT: Decimal = Decimal::ONE;

/// Largest accepted purchase amount (1,000,000).
pub const MAX_PURCHASE_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Highest tax share of a purchase regardless of regime, in percent.
pub const MAX_TAX_PERCENT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Facts gathered by the store before admitting a transaction.
#[derive(Debug, Clone, Default)]
pub struct AdmissionContext {
    /// Whether the referenced customer exists.
    pub customer_exists: bool,
    /// Whether the referenced product exists.
    pub product_exists: bool,
    /// Whether the transaction id is already taken.
    pub duplicate: bool,
    /// Every stored transaction for the same customer and product.
    pub history: Vec<Transaction>,
}

/// Decide whether a validated transaction may be inserted.
///
/// Missing references are reported before a duplicate id, and both before
/// any business rule.
///
/// # Errors
///
/// Returns the first failing check.
pub fn admit(trx: &Transaction, ctx: &AdmissionContext) -> Result<()> {
    if !ctx.customer_exists {
        return Err(DomainError::NotFound(Entity::Customer));
    }
    if !ctx.product_exists {
        return Err(DomainError::NotFound(Entity::Product));
    }
    if ctx.duplicate {
        return Err(DomainError::DuplicateTransactionId);
    }
    check_business_rules(trx, &ctx.history)
}

/// Apply the type-specific rules to `trx` given the pair's history.
///
/// # Errors
///
/// Returns the rule that the transaction breaks.
pub fn check_business_rules(trx: &Transaction, history: &[Transaction]) -> Result<()> {
    match trx.transaction_type {
        TransactionType::Refund => check_refund(trx, history),
        TransactionType::Purchase => check_purchase(trx),
        TransactionType::Payment => {
            if trx.amount <= Decimal::ZERO {
                return Err(DomainError::PaymentAmountNotPositive);
            }
            Ok(())
        }
    }
}

/// Amount still refundable for a pair: purchases minus refunds.
#[must_use]
pub fn refundable_balance(history: &[Transaction]) -> Decimal {
    history
        .iter()
        .fold(Decimal::ZERO, |acc, t| match t.transaction_type {
            TransactionType::Purchase => acc + t.amount,
            TransactionType::Refund => acc - t.amount,
            TransactionType::Payment => acc,
        })
}

fn check_refund(trx: &Transaction, history: &[Transaction]) -> Result<()> {
    if history.is_empty() {
        return Err(DomainError::InsufficientPurchaseHistory);
    }

    if trx.amount > refundable_balance(history) {
        return Err(DomainError::RefundExceedsAvailable);
    }

    if trx.amount <= Decimal::ZERO {
        return Err(DomainError::RefundAmountNotPositive);
    }

    let latest_purchase = history
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Purchase)
        .map(|t| t.transaction_datetime)
        .max()
        .ok_or(DomainError::NoPurchaseForRefund)?;

    if trx.transaction_datetime > latest_purchase + Duration::days(REFUND_WINDOW_DAYS) {
        return Err(DomainError::RefundWindowExpired);
    }

    Ok(())
}

fn check_purchase(trx: &Transaction) -> Result<()> {
    if trx.amount < MIN_PURCHASE_AMOUNT {
        return Err(DomainError::PurchaseBelowMinimum);
    }
    if trx.amount > MAX_PURCHASE_AMOUNT {
        return Err(DomainError::PurchaseAboveMaximum);
    }

    if trx.tax_amount > Decimal::ZERO {
        // The amount is bounded above, so scaling it cannot overflow.
        let share_of_amount = |percent: Decimal| trx.amount * percent / Decimal::ONE_HUNDRED;
        if trx.tax_amount > share_of_amount(MAX_TAX_PERCENT) {
            return Err(DomainError::TaxRatioTooHigh);
        }
        if let Some(tax_type) = trx.tax_type {
            if trx.tax_amount > share_of_amount(tax_ceiling(tax_type)) {
                return Err(match tax_type {
                    TaxType::Vat => DomainError::VatRateTooHigh,
                    TaxType::Gst => DomainError::GstRateTooHigh,
                    TaxType::SalesTax => DomainError::SalesTaxRateTooHigh,
                });
            }
        }
    }

    Ok(())
}

/// Maximum tax share of a purchase for a regime, in percent.
#[must_use]
pub fn tax_ceiling(tax_type: TaxType) -> Decimal {
    match tax_type {
        TaxType::Vat => Decimal::from(25),
        TaxType::Gst => Decimal::from(15),
        TaxType::SalesTax => Decimal::from(12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::PaymentStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn trx(id: i64, kind: TransactionType, amount: &str, when: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            customer_id: 5,
            transaction_type: kind,
            amount: dec(amount),
            transaction_datetime: when,
            tax_amount: Decimal::ZERO,
            tax_type: None,
            payment_status: PaymentStatus::Completed,
            product_id: 9,
        }
    }

    fn purchase_with_tax(amount: &str, tax: &str, tax_type: Option<TaxType>) -> Transaction {
        let mut t = trx(1, TransactionType::Purchase, amount, at(1));
        t.tax_amount = dec(tax);
        t.tax_type = tax_type;
        t
    }

    // ========================================================================
    // Admission ordering
    // ========================================================================

    #[test]
    fn missing_customer_beats_everything() {
        let ctx = AdmissionContext {
            customer_exists: false,
            product_exists: false,
            duplicate: true,
            history: vec![],
        };
        let t = trx(1, TransactionType::Purchase, "0.10", at(1));
        assert_eq!(admit(&t, &ctx), Err(DomainError::NotFound(Entity::Customer)));
    }

    #[test]
    fn missing_product_beats_duplicate() {
        let ctx = AdmissionContext {
            customer_exists: true,
            product_exists: false,
            duplicate: true,
            history: vec![],
        };
        let t = trx(1, TransactionType::Purchase, "10.00", at(1));
        assert_eq!(admit(&t, &ctx), Err(DomainError::NotFound(Entity::Product)));
    }

    #[test]
    fn duplicate_beats_business_rules() {
        let ctx = AdmissionContext {
            customer_exists: true,
            product_exists: true,
            duplicate: true,
            history: vec![],
        };
        let t = trx(1, TransactionType::Purchase, "0.10", at(1));
        assert_eq!(admit(&t, &ctx), Err(DomainError::DuplicateTransactionId));
    }

    // ========================================================================
    // Refunds
    // ========================================================================

    #[test]
    fn refund_without_history_is_rejected() {
        let t = trx(2, TransactionType::Refund, "10.00", at(2));
        assert_eq!(
            check_business_rules(&t, &[]),
            Err(DomainError::InsufficientPurchaseHistory)
        );
    }

    #[test]
    fn refund_up_to_remaining_balance_succeeds() {
        let history = vec![
            trx(1, TransactionType::Purchase, "100.00", at(1)),
            trx(2, TransactionType::Purchase, "50.00", at(3)),
            trx(3, TransactionType::Refund, "30.00", at(4)),
        ];
        let exact = trx(4, TransactionType::Refund, "120.00", at(5));
        assert!(check_business_rules(&exact, &history).is_ok());

        let over = trx(4, TransactionType::Refund, "120.01", at(5));
        assert_eq!(
            check_business_rules(&over, &history),
            Err(DomainError::RefundExceedsAvailable)
        );
    }

    #[test]
    fn refund_with_only_payments_has_no_purchase() {
        let history = vec![trx(1, TransactionType::Payment, "100.00", at(1))];
        let t = trx(2, TransactionType::Refund, "10.00", at(2));
        // Payments do not add to the refundable balance.
        assert_eq!(
            check_business_rules(&t, &history),
            Err(DomainError::RefundExceedsAvailable)
        );
    }

    #[test]
    fn refund_window_is_thirty_days_after_latest_purchase() {
        let history = vec![trx(1, TransactionType::Purchase, "100.00", at(1))];

        let on_deadline = trx(2, TransactionType::Refund, "10.00", at(31));
        assert!(check_business_rules(&on_deadline, &history).is_ok());

        let late = trx(
            2,
            TransactionType::Refund,
            "10.00",
            at(31) + Duration::seconds(1),
        );
        assert_eq!(
            check_business_rules(&late, &history),
            Err(DomainError::RefundWindowExpired)
        );
    }

    #[test]
    fn refundable_balance_ignores_payments() {
        let history = vec![
            trx(1, TransactionType::Purchase, "80.00", at(1)),
            trx(2, TransactionType::Payment, "80.00", at(2)),
            trx(3, TransactionType::Refund, "20.00", at(3)),
        ];
        assert_eq!(refundable_balance(&history), dec("60.00"));
    }

    // ========================================================================
    // Purchases
    // ========================================================================

    #[test]
    fn purchase_amount_limits() {
        assert_eq!(
            check_business_rules(&purchase_with_tax("0.99", "0", None), &[]),
            Err(DomainError::PurchaseBelowMinimum)
        );
        assert!(check_business_rules(&purchase_with_tax("1.00", "0", None), &[]).is_ok());
        assert!(check_business_rules(&purchase_with_tax("1000000", "0", None), &[]).is_ok());
        assert_eq!(
            check_business_rules(&purchase_with_tax("1000000.01", "0", None), &[]),
            Err(DomainError::PurchaseAboveMaximum)
        );
    }

    #[test]
    fn general_tax_ceiling_applies_without_type() {
        assert!(check_business_rules(&purchase_with_tax("100", "50", None), &[]).is_ok());
        assert_eq!(
            check_business_rules(&purchase_with_tax("100", "50.01", None), &[]),
            Err(DomainError::TaxRatioTooHigh)
        );
    }

    #[test]
    fn enormous_tax_is_rejected_without_overflow() {
        let max = Decimal::MAX.to_string();
        assert_eq!(
            check_business_rules(&purchase_with_tax("100", &max, None), &[]),
            Err(DomainError::TaxRatioTooHigh)
        );
        assert_eq!(
            check_business_rules(
                &purchase_with_tax("1", "1000000000000000000000000000", Some(TaxType::Vat)),
                &[]
            ),
            Err(DomainError::TaxRatioTooHigh)
        );
    }

    #[test]
    fn per_type_tax_ceilings() {
        assert!(
            check_business_rules(&purchase_with_tax("100", "25", Some(TaxType::Vat)), &[]).is_ok()
        );
        assert_eq!(
            check_business_rules(&purchase_with_tax("100", "30", Some(TaxType::Vat)), &[]),
            Err(DomainError::VatRateTooHigh)
        );
        assert_eq!(
            check_business_rules(&purchase_with_tax("100", "16", Some(TaxType::Gst)), &[]),
            Err(DomainError::GstRateTooHigh)
        );
        assert_eq!(
            check_business_rules(
                &purchase_with_tax("100", "12.5", Some(TaxType::SalesTax)),
                &[]
            ),
            Err(DomainError::SalesTaxRateTooHigh)
        );
    }

    #[test]
    fn payment_must_be_positive() {
        let t = trx(1, TransactionType::Payment, "0", at(1));
        assert_eq!(
            check_business_rules(&t, &[]),
            Err(DomainError::PaymentAmountNotPositive)
        );
    }
}
