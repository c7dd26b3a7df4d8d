//! Reproduction lifecycle queries for a holding.
//!
//! Answers two questions against the persisted reproductions:
//! which reproduction currently claims a holding, and whether any
//! reproduction ever referenced it.
//!
//! The queries hold no locks and give no atomicity across calls. Keeping
//! "at most one active reproduction per holding" true is the job of the
//! code that creates reproductions and moves their status (see
//! [`crate::services::reproductions::ReproductionsService::create`]); this
//! module only reports a violation when it finds one.

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{Holding, Reproduction, ReproductionStatus},
};

/// Reproductions linked to one holding, optionally restricted by status.
///
/// Results are ordered by creation date, then id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReproductionQuery {
    pub holding_id: i32,
    pub statuses: Option<Vec<ReproductionStatus>>,
    pub limit: Option<i64>,
}

impl ReproductionQuery {
    /// Every reproduction that ever referenced the holding
    pub fn for_holding(holding_id: i32) -> Self {
        Self {
            holding_id,
            statuses: None,
            limit: None,
        }
    }

    /// Reproductions of the holding that are still in progress
    pub fn active_for(holding_id: i32) -> Self {
        Self::for_holding(holding_id).with_statuses(ReproductionStatus::active_set())
    }

    pub fn with_statuses(mut self, statuses: Vec<ReproductionStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a reproduction with `status` passes the status filter
    pub fn accepts(&self, status: ReproductionStatus) -> bool {
        self.statuses
            .as_ref()
            .map(|set| set.contains(&status))
            .unwrap_or(true)
    }

    /// Status codes as stored, `None` when unfiltered
    pub fn status_codes(&self) -> Option<Vec<i16>> {
        self.statuses
            .as_ref()
            .map(|set| set.iter().map(|s| i16::from(*s)).collect())
    }
}

/// Read access to persisted reproductions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReproductionStore: Send + Sync {
    /// Reproductions matching the query
    async fn list(&self, query: &ReproductionQuery) -> AppResult<Vec<Reproduction>>;

    /// Number of holding reproduction rows matching the query
    async fn count(&self, query: &ReproductionQuery) -> AppResult<i64>;

    /// The single reproduction matching the query.
    ///
    /// Fails with [`AppError::ConsistencyViolation`] when more than one matches.
    async fn get(&self, query: &ReproductionQuery) -> AppResult<Option<Reproduction>> {
        let mut rows = self.list(&query.clone().with_limit(2)).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => {
                let ids: Vec<String> = rows.iter().map(|r| r.id.to_string()).collect();
                Err(AppError::ConsistencyViolation(format!(
                    "expected at most one reproduction for holding {}, found reproductions {}",
                    query.holding_id,
                    ids.join(", ")
                )))
            }
        }
    }
}

/// Lifecycle queries over a [`ReproductionStore`]
#[derive(Clone)]
pub struct ReproductionLifecycle<S> {
    store: S,
}

impl<S: ReproductionStore> ReproductionLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The in-progress reproduction containing `holding`, if any
    pub async fn get_active_for(&self, holding: &Holding) -> AppResult<Option<Reproduction>> {
        self.get_active_for_id(holding_identity(holding)?).await
    }

    /// The in-progress reproduction containing the holding with this id, if any
    pub async fn get_active_for_id(&self, holding_id: i32) -> AppResult<Option<Reproduction>> {
        check_holding_id(holding_id)?;

        let query = ReproductionQuery::active_for(holding_id);
        tracing::debug!("Looking up active reproduction: {:?}", query);

        match self.store.get(&query).await {
            Err(AppError::ConsistencyViolation(msg)) => {
                tracing::error!(holding_id, "Multiple active reproductions: {}", msg);
                Err(AppError::ConsistencyViolation(msg))
            }
            other => other,
        }
    }

    /// Whether any reproduction, active or finished, ever referenced `holding`
    pub async fn has_reproductions(&self, holding: &Holding) -> AppResult<bool> {
        self.has_reproductions_for_id(holding_identity(holding)?).await
    }

    pub async fn has_reproductions_for_id(&self, holding_id: i32) -> AppResult<bool> {
        check_holding_id(holding_id)?;

        let count = self.store.count(&ReproductionQuery::for_holding(holding_id)).await?;
        Ok(count > 0)
    }
}

fn holding_identity(holding: &Holding) -> AppResult<i32> {
    holding.id.ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "holding {} has not been saved",
            holding.signature
        ))
    })
}

fn check_holding_id(holding_id: i32) -> AppResult<()> {
    if holding_id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "invalid holding id {}",
            holding_id
        )));
    }
    Ok(())
}
