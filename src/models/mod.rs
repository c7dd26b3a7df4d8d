//! Data models for the delivery core

pub mod enums;
pub mod holding;
pub mod holding_reproduction;
pub mod reproduction;
pub mod standard_option;

// Re-export commonly used types
pub use enums::{HoldingStatus, ReproductionLevel, ReproductionStatus, UsageRestriction};
pub use holding::{Holding, HoldingReproductionSummary};
pub use holding_reproduction::{HoldingReproduction, NewHoldingReproduction};
pub use reproduction::{NewReproduction, Reproduction};
pub use standard_option::ReproductionStandardOption;
