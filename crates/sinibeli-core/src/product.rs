//! Product entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::fields::{positive_id, required_text};

/// Maximum length of a product name.
pub const PRODUCT_NAME_MAX: usize = 100;

/// A product that transactions are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Caller-supplied identifier.
    pub id: i64,

    /// Display name.
    pub product_name: String,

    /// Fee charged per transaction.
    pub service_fee: Decimal,

    /// Whether `service_fee` is a percentage rate rather than a flat amount.
    pub service_fee_percentage: bool,
}

impl Product {
    /// Check identifier, name and fee.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        positive_id(self.id)?;
        required_text("product_name", &self.product_name, PRODUCT_NAME_MAX)?;
        if self.service_fee.is_sign_negative() && !self.service_fee.is_zero() {
            return Err(DomainError::NegativeServiceFee);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fee_is_rejected() {
        let p = Product {
            id: 9,
            product_name: "Top-up".into(),
            service_fee: Decimal::new(-150, 2),
            service_fee_percentage: false,
        };
        assert_eq!(p.validate(), Err(DomainError::NegativeServiceFee));
    }

    #[test]
    fn fee_serializes_as_string() {
        let p = Product {
            id: 9,
            product_name: "Top-up".into(),
            service_fee: Decimal::new(250, 2),
            service_fee_percentage: true,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["service_fee"], "2.50");
        assert!(p.validate().is_ok());
    }
}
