//! Company entity.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fields::{positive_id, required_text};

/// Maximum length of a company name.
pub const COMPANY_NAME_MAX: usize = 25;

/// Maximum length of a company type.
pub const COMPANY_TYPE_MAX: usize = 25;

/// Maximum length of a company address.
pub const COMPANY_ADDRESS_MAX: usize = 255;

/// Maximum length of a company city.
pub const COMPANY_CITY_MAX: usize = 100;

/// A company owning customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Caller-supplied identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form business type.
    #[serde(rename = "type")]
    pub company_type: String,

    /// Street address.
    pub address: String,

    /// City.
    pub city: String,
}

impl Company {
    /// Check identifier and field lengths.
    ///
    /// # Errors
    ///
    /// Returns the first field that is missing or too long.
    pub fn validate(&self) -> Result<()> {
        positive_id(self.id)?;
        required_text("name", &self.name, COMPANY_NAME_MAX)?;
        required_text("type", &self.company_type, COMPANY_TYPE_MAX)?;
        required_text("address", &self.address, COMPANY_ADDRESS_MAX)?;
        required_text("city", &self.city, COMPANY_CITY_MAX)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    fn company() -> Company {
        Company {
            id: 1,
            name: "Acme".into(),
            company_type: "retail".into(),
            address: "1 Main St".into(),
            city: "Jakarta".into(),
        }
    }

    #[test]
    fn valid_company_passes() {
        assert!(company().validate().is_ok());
    }

    #[test]
    fn name_longer_than_limit_fails() {
        let mut c = company();
        c.name = "x".repeat(26);
        assert_eq!(
            c.validate(),
            Err(DomainError::FieldTooLong {
                field: "name",
                max: 25
            })
        );
    }

    #[test]
    fn type_serializes_under_reserved_name() {
        let json = serde_json::to_value(company()).unwrap();
        assert_eq!(json["type"], "retail");
        assert!(json.get("company_type").is_none());
    }
}
