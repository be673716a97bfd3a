//! Error types for sinibeli storage.

use sinibeli_core::{DomainError, Entity};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed. The message carries the failing operation.
    #[error("{0}")]
    Database(String),

    /// A stored row could not be turned back into a domain value.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// An entity with the same id already exists.
    #[error("{entity} with id {id} already exists")]
    AlreadyExists {
        /// Kind of entity.
        entity: Entity,
        /// The duplicated id.
        id: i64,
    },

    /// The store refused a write because a domain check failed.
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

impl StoreError {
    /// Wrap a driver error with the operation that failed.
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Database(format!("{context}: {err}"))
    }
}

/// Whether a sqlx error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}
