//! Priced catalog options for reproductions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::enums::ReproductionLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReproductionStandardOption {
    pub id: i32,
    pub material_type: String,
    #[sqlx(try_from = "i16")]
    pub level: ReproductionLevel,
    pub option_name_en: String,
    pub option_name_nl: String,
    pub option_description_en: String,
    pub option_description_nl: String,
    pub price: Decimal,
    pub delivery_time: i32,
    pub enabled: bool,
}

/// Create standard option request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStandardOption {
    #[validate(length(min = 1, max = 50))]
    pub material_type: String,
    pub level: ReproductionLevel,
    #[validate(length(min = 1, max = 50, message = "Option name must be 1-50 characters"))]
    pub option_name_en: String,
    #[validate(length(min = 1, max = 50, message = "Option name must be 1-50 characters"))]
    pub option_name_nl: String,
    #[validate(length(min = 1, max = 255))]
    pub option_description_en: String,
    #[validate(length(min = 1, max = 255))]
    pub option_description_nl: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Delivery time cannot be negative"))]
    pub delivery_time: i32,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    // NUMERIC(7,2)
    if price.trunc().abs() >= Decimal::from(100_000) || price.scale() > 2 {
        return Err(ValidationError::new("price_digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(price: Decimal) -> CreateStandardOption {
        CreateStandardOption {
            material_type: "BOOK".to_string(),
            level: ReproductionLevel::Level1,
            option_name_en: "Scan".to_string(),
            option_name_nl: "Scan".to_string(),
            option_description_en: "300 dpi scan".to_string(),
            option_description_nl: "300 dpi scan".to_string(),
            price,
            delivery_time: 5,
        }
    }

    #[test]
    fn test_price_must_fit_column() {
        assert!(option(Decimal::new(1250, 2)).validate().is_ok());
        assert!(option(Decimal::new(-1, 0)).validate().is_err());
        assert!(option(Decimal::new(12345, 3)).validate().is_err());
        assert!(option(Decimal::from(100_000)).validate().is_err());
    }
}
