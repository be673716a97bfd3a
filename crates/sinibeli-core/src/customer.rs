//! Customer entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::fields::{optional_text, positive_id, required_text};

/// Maximum length of first and last names.
pub const CUSTOMER_NAME_MAX: usize = 50;

/// A customer belonging to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Caller-supplied identifier.
    pub id: i64,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Gender as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Owning company.
    pub company_id: i64,

    /// Photo URL or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Customer {
    /// Check identifiers and name lengths.
    ///
    /// Does not check that the owning company exists.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        positive_id(self.id)?;
        required_text("first_name", &self.first_name, CUSTOMER_NAME_MAX)?;
        required_text("last_name", &self.last_name, CUSTOMER_NAME_MAX)?;
        optional_text("email", self.email.as_deref(), 255)?;
        if self.company_id <= 0 {
            return Err(DomainError::InvalidCompanyId);
        }
        Ok(())
    }

    /// First and last name joined by a single space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
