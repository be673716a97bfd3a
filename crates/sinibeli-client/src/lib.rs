//! Sinibeli Client SDK.
//!
//! A typed client for the sinibeli transaction and report API.
//!
//! # Example
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use sinibeli_client::{CreateTransaction, SinibeliClient, SummaryQuery};
//!
//! # async fn example() -> Result<(), sinibeli_client::ClientError> {
//! let client = SinibeliClient::new("http://sinibeli:8080")?.with_token("jwt");
//!
//! let trx = client
//!     .create_transaction(&CreateTransaction::purchase(1, 5, 9, Decimal::new(10000, 2)))
//!     .await?;
//! println!("recorded {} at {}", trx.id, trx.transaction_datetime);
//!
//! let report = client
//!     .transaction_summary(&SummaryQuery {
//!         company_id: Some(1),
//!         ..SummaryQuery::default()
//!     })
//!     .await?;
//! println!("{} groups", report.pagination.total_items);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, SinibeliClient};
pub use error::ClientError;
pub use types::*;
