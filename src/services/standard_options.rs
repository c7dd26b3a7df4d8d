//! Reproduction standard options service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{standard_option::CreateStandardOption, ReproductionStandardOption},
    repository::Repository,
};

#[derive(Clone)]
pub struct StandardOptionsService {
    repository: Repository,
}

impl StandardOptionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, enabled_only: bool) -> AppResult<Vec<ReproductionStandardOption>> {
        self.repository.standard_options.list(enabled_only).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ReproductionStandardOption> {
        self.repository.standard_options.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateStandardOption) -> AppResult<ReproductionStandardOption> {
        data.validate()?;
        self.repository.standard_options.create(data).await
    }

    pub async fn set_enabled(&self, id: i32, enabled: bool) -> AppResult<ReproductionStandardOption> {
        self.repository.standard_options.set_enabled(id, enabled).await
    }
}
