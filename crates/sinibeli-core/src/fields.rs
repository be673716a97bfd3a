//! Shared field checks for entity validation.

use crate::error::{DomainError, Result};

/// Require a non-blank string no longer than `max` characters.
pub(crate) fn required_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    optional_text(field, Some(value), max)
}

/// Bound an optional string to `max` characters.
pub(crate) fn optional_text(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(DomainError::FieldTooLong { field, max }),
        _ => Ok(()),
    }
}

/// Require a strictly positive identifier.
pub(crate) fn positive_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(DomainError::InvalidId);
    }
    Ok(())
}
