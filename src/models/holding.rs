//! Holding (physical archive item) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::enums::{HoldingStatus, UsageRestriction};

/// Holding model.
///
/// `id` is `None` until the holding has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub id: Option<i32>,
    pub record_id: i32,
    pub signature: String,
    #[sqlx(try_from = "i16")]
    pub status: HoldingStatus,
    #[sqlx(try_from = "i16")]
    pub usage_restriction: UsageRestriction,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Holding {
    /// An in-memory holding that has not been saved yet
    pub fn unsaved(record_id: i32, signature: impl Into<String>) -> Self {
        Self {
            id: None,
            record_id,
            signature: signature.into(),
            status: HoldingStatus::Available,
            usage_restriction: UsageRestriction::Open,
            crea_date: None,
            modif_date: None,
        }
    }
}

/// Create holding request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHolding {
    pub record_id: i32,
    #[validate(length(min = 1, max = 50, message = "Signature must be 1-50 characters"))]
    pub signature: String,
    pub usage_restriction: Option<UsageRestriction>,
}

/// What a holding's reproduction history looks like, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingReproductionSummary {
    pub holding_id: i32,
    pub active_reproduction_id: Option<i32>,
    pub previously_reproduced: bool,
}
