//! Orchestration between handlers and the store.
//!
//! Each service borrows the store (and cache, where it reads through one)
//! from [`AppState`](crate::state::AppState) for the duration of a request.
//! Services run validation, existence checks and cache maintenance; handlers
//! only translate HTTP to and from these calls.

mod company;
mod customer;
mod product;
mod transaction;

pub use company::CompanyService;
pub use customer::CustomerService;
pub use product::ProductService;
pub use transaction::TransactionService;

use crate::error::ServiceError;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
