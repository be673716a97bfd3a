//! Core types and business rules for sinibeli.
//!
//! This crate has no I/O. It provides:
//!
//! - **Entities**: `Company`, `Customer`, `Product`, `Transaction`
//! - **Validation**: field checks on every entity, `NewTransaction::into_transaction`
//! - **Admission**: `admit` and `check_business_rules` for refunds, purchases and payments
//! - **Reports**: `TransactionSummary`, `CustomerActivity`, filters and pagination
//!
//! # Money
//!
//! Amounts are `rust_decimal::Decimal` everywhere and serialize as strings
//! (`"100.00"`), matching the `NUMERIC(15,2)` columns they are stored in.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod company;
pub mod customer;
pub mod error;
mod fields;
pub mod product;
pub mod report;
pub mod rules;
pub mod transaction;

pub use company::Company;
pub use customer::Customer;
pub use error::{DomainError, Entity, ErrorKind, Result};
pub use product::Product;
pub use report::{
    end_of_day, start_of_day, ActivityFilter, CustomerActivity, Page, PageRequest, Pagination,
    SummaryFilter, TransactionSummary, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use rules::{admit, check_business_rules, refundable_balance, AdmissionContext};
pub use transaction::{
    NewTransaction, PaymentStatus, TaxType, Transaction, TransactionType,
    VALID_PAYMENT_STATUSES, VALID_TAX_TYPES, VALID_TRANSACTION_TYPES,
};
