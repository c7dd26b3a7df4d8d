//! Reproduction (copy order) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::enums::ReproductionStatus;
use super::holding_reproduction::NewHoldingReproduction;

/// Reproduction model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reproduction {
    pub id: i32,
    pub customer_name: String,
    pub customer_email: String,
    #[sqlx(try_from = "i16")]
    pub status: ReproductionStatus,
    pub creation_date: DateTime<Utc>,
    pub date_has_order_details: Option<DateTime<Utc>>,
    pub date_payment_accepted: Option<DateTime<Utc>>,
    pub discount_percentage: i32,
    pub comment: Option<String>,
}

impl Reproduction {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Move to `status` if that is a forward step.
    ///
    /// Returns whether the status changed.
    pub fn advance_to(&mut self, status: ReproductionStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_advance_to(status) {
            return false;
        }
        self.status = status;
        match status {
            ReproductionStatus::HasOrderDetails => self.date_has_order_details = Some(now),
            ReproductionStatus::Active => self.date_payment_accepted = Some(now),
            _ => {}
        }
        true
    }
}

/// A patron's request: the reproduction and its line items, created together
#[derive(Debug, Deserialize, Validate)]
pub struct NewReproduction {
    #[validate(length(min = 1, max = 255, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(range(min = 0, max = 100, message = "Discount must be 0-100%"))]
    pub discount_percentage: Option<i32>,
    pub comment: Option<String>,
    #[validate(length(min = 1, message = "At least one holding is required"), nested)]
    pub holdings: Vec<NewHoldingReproduction>,
}

impl NewReproduction {
    /// The initial status: requests that already carry full order details skip the wait
    pub fn initial_status(&self) -> ReproductionStatus {
        if self.holdings.iter().all(|hr| hr.has_order_details()) {
            ReproductionStatus::HasOrderDetails
        } else {
            ReproductionStatus::WaitingForOrderDetails
        }
    }
}

/// A holding claimed by more than one in-progress reproduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ActiveConflict {
    pub holding_id: i32,
    pub reproduction_ids: Vec<i32>,
}

/// Sum of line item prices after per-item discount
pub fn total_price(items: &[super::HoldingReproduction]) -> Decimal {
    items
        .iter()
        .filter_map(|hr| hr.complete_price_with_discount())
        .sum()
}
