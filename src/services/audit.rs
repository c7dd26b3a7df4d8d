//! Data integrity audit for active reproductions

use crate::{error::AppResult, models::reproduction::ActiveConflict, repository::Repository};

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Holdings claimed by more than one active reproduction, each logged as an error
    pub async fn active_reproduction_conflicts(&self) -> AppResult<Vec<ActiveConflict>> {
        let conflicts = self.repository.reproductions.active_conflicts().await?;

        for conflict in &conflicts {
            tracing::error!(
                holding_id = conflict.holding_id,
                "Holding has {} active reproductions: {:?}",
                conflict.reproduction_ids.len(),
                conflict.reproduction_ids
            );
        }
        if conflicts.is_empty() {
            tracing::info!("No holding has more than one active reproduction");
        }

        Ok(conflicts)
    }
}
