//! Sinibeli HTTP API Service.
//!
//! This crate provides the HTTP API for sinibeli, including:
//!
//! - Company, customer and product management
//! - Transaction recording with refund, purchase and payment rules
//! - Paginated transaction summaries and customer activity reports
//!
//! # Layers
//!
//! Handlers parse requests and map errors to status codes. Services in
//! [`services`] validate and orchestrate. The store from `sinibeli-store`
//! persists. Product and company reads go through the Redis-backed
//! [`cache`] when one is configured.
//!
//! # Authentication
//!
//! HS256 JWTs (see [`auth`]). Enforced on every `/api/v1` route only when
//! `AUTH_REQUIRED=true`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router even when trivial

pub mod auth;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{AuthUser, JwtService};
pub use cache::{Cache, CacheBackend, MemoryBackend, RedisBackend};
pub use config::{LogFormat, ServiceConfig};
pub use crypto::PasswordHasher;
pub use error::{ApiError, ServiceError};
pub use routes::create_router;
pub use state::AppState;
