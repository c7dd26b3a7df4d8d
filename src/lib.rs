//! Delivery reproduction core
//!
//! Persistence and lifecycle queries for reproduction orders placed on
//! physical archive holdings.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::lifecycle::{ReproductionLifecycle, ReproductionQuery, ReproductionStore};
