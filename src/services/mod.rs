//! Business logic services

pub mod audit;
pub mod holdings;
pub mod lifecycle;
pub mod reproductions;
pub mod standard_options;

use crate::{
    config::ReproductionsConfig,
    repository::{reproductions::ReproductionsRepository, Repository},
};
use lifecycle::ReproductionLifecycle;

/// Lifecycle queries backed by Postgres
pub type PgReproductionLifecycle = ReproductionLifecycle<ReproductionsRepository>;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lifecycle: PgReproductionLifecycle,
    pub reproductions: reproductions::ReproductionsService,
    pub holdings: holdings::HoldingsService,
    pub standard_options: standard_options::StandardOptionsService,
    pub audit: audit::AuditService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, reproductions_config: ReproductionsConfig) -> Self {
        let lifecycle = ReproductionLifecycle::new(repository.reproductions.clone());
        Self {
            reproductions: reproductions::ReproductionsService::new(
                repository.clone(),
                lifecycle.clone(),
                reproductions_config,
            ),
            holdings: holdings::HoldingsService::new(repository.clone(), lifecycle.clone()),
            standard_options: standard_options::StandardOptionsService::new(repository.clone()),
            audit: audit::AuditService::new(repository),
            lifecycle,
        }
    }
}
