//! Shared domain enums (stored as SMALLINT codes)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored code does not map to any known variant
#[derive(Debug, Error)]
#[error("unknown {kind} code {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i16,
}

// ---------------------------------------------------------------------------
// ReproductionStatus
// ---------------------------------------------------------------------------

/// Status of a reproduction order.
///
/// Variants are declared in workflow order; a reproduction only ever moves
/// forward through this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum ReproductionStatus {
    WaitingForOrderDetails = 0,
    HasOrderDetails = 1,
    Confirmed = 2,
    Active = 3,
    Completed = 4,
    Delivered = 5,
    Cancelled = 6,
}

impl ReproductionStatus {
    pub const ALL: [ReproductionStatus; 7] = [
        ReproductionStatus::WaitingForOrderDetails,
        ReproductionStatus::HasOrderDetails,
        ReproductionStatus::Confirmed,
        ReproductionStatus::Active,
        ReproductionStatus::Completed,
        ReproductionStatus::Delivered,
        ReproductionStatus::Cancelled,
    ];

    /// Completed, delivered and cancelled reproductions no longer claim their holdings
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReproductionStatus::Completed | ReproductionStatus::Delivered | ReproductionStatus::Cancelled
        )
    }

    /// Whether the order is still in progress
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// The statuses counted as "in progress"
    pub fn active_set() -> Vec<ReproductionStatus> {
        Self::ALL.into_iter().filter(|s| s.is_active()).collect()
    }

    /// Stored codes of the active set
    pub fn active_codes() -> Vec<i16> {
        Self::active_set().into_iter().map(i16::from).collect()
    }

    /// Whether moving to `next` is a forward step
    pub fn can_advance_to(self, next: ReproductionStatus) -> bool {
        next > self
    }
}

impl TryFrom<i16> for ReproductionStatus {
    type Error = UnknownCode;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ReproductionStatus::WaitingForOrderDetails),
            1 => Ok(ReproductionStatus::HasOrderDetails),
            2 => Ok(ReproductionStatus::Confirmed),
            3 => Ok(ReproductionStatus::Active),
            4 => Ok(ReproductionStatus::Completed),
            5 => Ok(ReproductionStatus::Delivered),
            6 => Ok(ReproductionStatus::Cancelled),
            code => Err(UnknownCode { kind: "reproduction status", code }),
        }
    }
}

impl From<ReproductionStatus> for i16 {
    fn from(s: ReproductionStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for ReproductionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReproductionStatus::WaitingForOrderDetails => "Waiting for order details",
            ReproductionStatus::HasOrderDetails => "Has order details",
            ReproductionStatus::Confirmed => "Confirmed",
            ReproductionStatus::Active => "Active",
            ReproductionStatus::Completed => "Completed",
            ReproductionStatus::Delivered => "Delivered",
            ReproductionStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// HoldingStatus
// ---------------------------------------------------------------------------

/// Circulation status of a physical holding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum HoldingStatus {
    #[default]
    Available = 0,
    Reserved = 1,
    InUse = 2,
    Returned = 3,
}

impl TryFrom<i16> for HoldingStatus {
    type Error = UnknownCode;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(HoldingStatus::Available),
            1 => Ok(HoldingStatus::Reserved),
            2 => Ok(HoldingStatus::InUse),
            3 => Ok(HoldingStatus::Returned),
            code => Err(UnknownCode { kind: "holding status", code }),
        }
    }
}

impl From<HoldingStatus> for i16 {
    fn from(s: HoldingStatus) -> Self {
        s as i16
    }
}

impl HoldingStatus {
    /// Status after staff at the desk mark the item: reserved items go into
    /// use, then come back, then return to the shelf
    pub fn next_marked(self) -> Self {
        match self {
            HoldingStatus::Reserved => HoldingStatus::InUse,
            HoldingStatus::InUse => HoldingStatus::Returned,
            HoldingStatus::Returned | HoldingStatus::Available => HoldingStatus::Available,
        }
    }
}

// ---------------------------------------------------------------------------
// UsageRestriction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum UsageRestriction {
    Open = 0,
    Closed = 1,
}

impl TryFrom<i16> for UsageRestriction {
    type Error = UnknownCode;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(UsageRestriction::Open),
            1 => Ok(UsageRestriction::Closed),
            code => Err(UnknownCode { kind: "usage restriction", code }),
        }
    }
}

impl From<UsageRestriction> for i16 {
    fn from(u: UsageRestriction) -> Self {
        u as i16
    }
}

// ---------------------------------------------------------------------------
// ReproductionLevel
// ---------------------------------------------------------------------------

/// Quality level offered by a standard reproduction option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum ReproductionLevel {
    Master = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
}

impl TryFrom<i16> for ReproductionLevel {
    type Error = UnknownCode;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ReproductionLevel::Master),
            1 => Ok(ReproductionLevel::Level1),
            2 => Ok(ReproductionLevel::Level2),
            3 => Ok(ReproductionLevel::Level3),
            code => Err(UnknownCode { kind: "reproduction level", code }),
        }
    }
}

impl From<ReproductionLevel> for i16 {
    fn from(l: ReproductionLevel) -> Self {
        l as i16
    }
}
