//! HoldingReproduction: one holding's line in a reproduction order

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Line item linking a reproduction to one holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HoldingReproduction {
    pub id: i32,
    pub reproduction_id: i32,
    pub holding_id: i32,
    pub standard_option_id: Option<i32>,
    pub custom_reproduction_customer: Option<String>,
    pub custom_reproduction_reply: Option<String>,
    /// Price per page
    pub price: Option<Decimal>,
    pub number_of_pages: i32,
    /// Delivery time in days
    pub delivery_time: Option<i32>,
    pub discount: Option<Decimal>,
    pub btw_percentage: Option<i32>,
    pub btw_price: Option<Decimal>,
    pub comment: Option<String>,
    pub printed: bool,
    pub completed: bool,
    pub in_sor: bool,
}

impl HoldingReproduction {
    /// Price per page multiplied by the number of pages
    pub fn complete_price(&self) -> Option<Decimal> {
        self.price.map(|p| p * Decimal::from(self.number_of_pages))
    }

    /// Complete price minus the discount, never below zero
    pub fn complete_price_with_discount(&self) -> Option<Decimal> {
        let price = self.complete_price()? - self.discount.unwrap_or(Decimal::ZERO);
        Some(price.max(Decimal::ZERO))
    }

    /// Discounted price with the BTW taken out, rounded half-up to cents
    pub fn complete_price_without_tax(&self) -> Option<Decimal> {
        let with_discount = self.complete_price_with_discount()?;
        let factor = Decimal::ONE + Decimal::from(self.btw_percentage.unwrap_or(0)) / Decimal::from(100);
        Some((with_discount / factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Price and delivery time are both known
    pub fn has_order_details(&self) -> bool {
        self.price.is_some() && self.delivery_time.is_some()
    }
}

/// Line item submitted with a new reproduction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_option_choice"))]
pub struct NewHoldingReproduction {
    pub holding_id: i32,
    pub standard_option_id: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Custom request must be 1-1000 characters"))]
    pub custom_reproduction_customer: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 1, message = "Number of pages must be at least 1"))]
    pub number_of_pages: Option<i32>,
    #[validate(range(min = 0, message = "Delivery time cannot be negative"))]
    pub delivery_time: Option<i32>,
    pub btw_percentage: Option<i32>,
    pub comment: Option<String>,
}

impl NewHoldingReproduction {
    pub fn has_order_details(&self) -> bool {
        self.price.is_some() && self.delivery_time.is_some()
    }

    /// Price rounded half-up to cents
    pub fn scaled_price(&self) -> Option<Decimal> {
        self.price
            .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Exactly one of a standard option or a custom description must be given
fn validate_option_choice(hr: &NewHoldingReproduction) -> Result<(), ValidationError> {
    let has_custom = hr
        .custom_reproduction_customer
        .as_deref()
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);

    if hr.standard_option_id.is_some() == has_custom {
        let mut err = ValidationError::new("option_choice");
        err.message = Some("Choose either a standard option or a custom reproduction".into());
        return Err(err);
    }

    if hr.price.map(|p| p.is_sign_negative()).unwrap_or(false) {
        let mut err = ValidationError::new("price");
        err.message = Some("Price cannot be negative".into());
        return Err(err);
    }

    Ok(())
}
