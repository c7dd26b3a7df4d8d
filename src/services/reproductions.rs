//! Reproduction order service

use std::collections::HashSet;

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    config::ReproductionsConfig,
    error::{AppError, AppResult},
    models::{
        reproduction::total_price, Holding, HoldingReproduction, NewReproduction, Reproduction,
        ReproductionStatus,
    },
    repository::Repository,
};

use super::PgReproductionLifecycle;

#[derive(Clone)]
pub struct ReproductionsService {
    repository: Repository,
    lifecycle: PgReproductionLifecycle,
    config: ReproductionsConfig,
}

impl ReproductionsService {
    pub fn new(
        repository: Repository,
        lifecycle: PgReproductionLifecycle,
        config: ReproductionsConfig,
    ) -> Self {
        Self { repository, lifecycle, config }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Reproduction> {
        self.repository.reproductions.get_by_id(id).await
    }

    pub async fn holding_reproductions(&self, id: i32) -> AppResult<Vec<HoldingReproduction>> {
        self.repository.reproductions.holding_reproductions(id).await
    }

    /// Create a reproduction for a patron request.
    ///
    /// Line items that pick a standard option take its price and delivery
    /// time unless given. Fails with `Conflict` when one of the holdings is
    /// already part of an active reproduction.
    pub async fn create(&self, mut data: NewReproduction) -> AppResult<Reproduction> {
        data.validate()?;
        self.check_holdings(&data)?;

        for hr in data.holdings.iter_mut() {
            if hr.custom_reproduction_customer.as_deref().map(str::trim) == Some("") {
                hr.custom_reproduction_customer = None;
            }
            if let Some(option_id) = hr.standard_option_id {
                let option = self.repository.standard_options.get_by_id(option_id).await?;
                if !option.enabled {
                    return Err(AppError::Validation(format!(
                        "Standard option {} is not available",
                        option_id
                    )));
                }
                hr.price.get_or_insert(option.price);
                hr.delivery_time.get_or_insert(option.delivery_time);
            }
        }

        let status = data.initial_status();
        let reproduction = self
            .repository
            .reproductions
            .add_guarded(&data, status, self.config.default_btw_percentage)
            .await?;

        tracing::info!(
            "Created reproduction {} ({}) for {} holding(s)",
            reproduction.id,
            reproduction.status,
            data.holdings.len()
        );
        Ok(reproduction)
    }

    /// Move a reproduction forward; backward moves are ignored
    pub async fn advance_status(&self, id: i32, status: ReproductionStatus) -> AppResult<Reproduction> {
        let (reproduction, changed) = self.repository.reproductions.advance_status(id, status).await?;
        if changed {
            tracing::info!("Reproduction {} is now {}", id, reproduction.status);
        } else {
            tracing::debug!(
                "Ignored status change of reproduction {} from {} to {}",
                id,
                reproduction.status,
                status
            );
        }
        Ok(reproduction)
    }

    /// Save customer details; a changed `status` is not written
    pub async fn save(&self, reproduction: &Reproduction) -> AppResult<Reproduction> {
        let saved = self.repository.reproductions.save(reproduction).await?;
        if saved.status != reproduction.status {
            tracing::warn!(
                "Status of reproduction {} stays {}; use advance_status to change it",
                saved.id,
                saved.status
            );
        }
        Ok(saved)
    }

    /// Handling desk: bump a holding to its next status and complete the
    /// active reproduction once all of its holdings are back on the shelf.
    ///
    /// Holdings without an active reproduction are still bumped.
    pub async fn mark_item(&self, holding_id: i32) -> AppResult<(Holding, Option<Reproduction>)> {
        let active = self.lifecycle.get_active_for_id(holding_id).await?;
        let (holding, reproduction) = self
            .repository
            .reproductions
            .mark_item(holding_id, active.map(|r| r.id))
            .await?;

        tracing::info!("Marked holding {} as {:?}", holding_id, holding.status);
        if let Some(r) = reproduction.as_ref().filter(|r| !r.is_active()) {
            tracing::info!("Reproduction {} is now {}", r.id, r.status);
        }
        Ok((holding, reproduction))
    }

    /// Administrative removal; reserved holdings are made available again
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        self.repository.reproductions.remove(id).await?;
        tracing::info!("Removed reproduction {}", id);
        Ok(())
    }

    /// Total price of all line items after discounts
    pub async fn total_price(&self, id: i32) -> AppResult<Decimal> {
        let items = self.repository.reproductions.holding_reproductions(id).await?;
        Ok(total_price(&items))
    }

    fn check_holdings(&self, data: &NewReproduction) -> AppResult<()> {
        if data.holdings.len() > self.config.max_items_per_reproduction {
            return Err(AppError::Validation(format!(
                "A reproduction may contain at most {} holdings",
                self.config.max_items_per_reproduction
            )));
        }
        check_unique_holdings(data)
    }
}

/// A holding may appear only once per reproduction
fn check_unique_holdings(data: &NewReproduction) -> AppResult<()> {
    let mut seen = HashSet::new();
    for hr in &data.holdings {
        if !seen.insert(hr.holding_id) {
            return Err(AppError::Validation(format!(
                "Holding {} appears more than once",
                hr.holding_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewHoldingReproduction;

    fn line(holding_id: i32) -> NewHoldingReproduction {
        NewHoldingReproduction {
            holding_id,
            standard_option_id: Some(1),
            custom_reproduction_customer: None,
            price: None,
            number_of_pages: None,
            delivery_time: None,
            btw_percentage: None,
            comment: None,
        }
    }

    fn request(holdings: Vec<NewHoldingReproduction>) -> NewReproduction {
        NewReproduction {
            customer_name: "A. Patron".to_string(),
            customer_email: "patron@example.org".to_string(),
            discount_percentage: None,
            comment: None,
            holdings,
        }
    }

    #[test]
    fn test_duplicate_holdings_are_rejected() {
        let err = check_unique_holdings(&request(vec![line(4), line(5), line(4)])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(check_unique_holdings(&request(vec![line(4), line(5)])).is_ok());
    }

    #[test]
    fn test_request_validation() {
        assert!(request(vec![]).validate().is_err());

        let mut bad_email = request(vec![line(1)]);
        bad_email.customer_email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        assert!(request(vec![line(1)]).validate().is_ok());
    }

    #[test]
    fn test_initial_status_depends_on_order_details() {
        let mut priced = line(1);
        priced.price = Some(Decimal::new(500, 2));
        priced.delivery_time = Some(3);

        assert_eq!(
            request(vec![priced.clone()]).initial_status(),
            ReproductionStatus::HasOrderDetails
        );
        assert_eq!(
            request(vec![priced, line(2)]).initial_status(),
            ReproductionStatus::WaitingForOrderDetails
        );
    }
}
