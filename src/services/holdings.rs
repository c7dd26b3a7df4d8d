//! Holdings service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{holding::CreateHolding, Holding, HoldingReproductionSummary, HoldingStatus},
    repository::Repository,
};

use super::PgReproductionLifecycle;

#[derive(Clone)]
pub struct HoldingsService {
    repository: Repository,
    lifecycle: PgReproductionLifecycle,
}

impl HoldingsService {
    pub fn new(repository: Repository, lifecycle: PgReproductionLifecycle) -> Self {
        Self { repository, lifecycle }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Holding> {
        self.repository.holdings.get_by_id(id).await
    }

    pub async fn list_for_record(&self, record_id: i32) -> AppResult<Vec<Holding>> {
        self.repository.holdings.list_for_record(record_id).await
    }

    pub async fn create(&self, data: &CreateHolding) -> AppResult<Holding> {
        data.validate()?;
        self.repository.holdings.create(data).await
    }

    pub async fn update_status(&self, id: i32, status: HoldingStatus) -> AppResult<Holding> {
        self.repository.holdings.update_status(id, status).await
    }

    /// Delete a holding that has never been reproduced
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.lifecycle.has_reproductions_for_id(id).await? {
            return Err(AppError::BusinessRule(format!(
                "Holding {} has reproduction history and cannot be deleted",
                id
            )));
        }
        self.repository.holdings.delete(id).await?;
        tracing::info!("Deleted holding {}", id);
        Ok(())
    }

    /// Active reproduction and "previously reproduced" flag for display
    pub async fn reproduction_summary(&self, holding: &Holding) -> AppResult<HoldingReproductionSummary> {
        let active = self.lifecycle.get_active_for(holding).await?;
        let previously_reproduced = self.lifecycle.has_reproductions(holding).await?;

        Ok(HoldingReproductionSummary {
            // get_active_for already rejected unsaved holdings
            holding_id: holding.id.unwrap_or_default(),
            active_reproduction_id: active.map(|r| r.id),
            previously_reproduced,
        })
    }
}
