//! API handlers.

pub mod companies;
pub mod customers;
pub mod health;
pub mod products;
pub mod transactions;
