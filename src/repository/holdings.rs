//! Holdings repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{holding::CreateHolding, Holding, HoldingStatus, UsageRestriction},
};

#[derive(Clone)]
pub struct HoldingsRepository {
    pool: Pool<Postgres>,
}

impl HoldingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get holding by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Holding> {
        sqlx::query_as::<_, Holding>("SELECT * FROM holdings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Holding with id {} not found", id)))
    }

    /// Get holdings of a record, ordered by signature
    pub async fn list_for_record(&self, record_id: i32) -> AppResult<Vec<Holding>> {
        let rows = sqlx::query_as::<_, Holding>(
            "SELECT * FROM holdings WHERE record_id = $1 ORDER BY signature",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a holding
    pub async fn create(&self, data: &CreateHolding) -> AppResult<Holding> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Holding>(
            r#"
            INSERT INTO holdings (record_id, signature, status, usage_restriction, crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(data.record_id)
        .bind(&data.signature)
        .bind(i16::from(HoldingStatus::Available))
        .bind(i16::from(data.usage_restriction.unwrap_or(UsageRestriction::Open)))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the circulation status of a holding
    pub async fn update_status(&self, id: i32, status: HoldingStatus) -> AppResult<Holding> {
        sqlx::query_as::<_, Holding>(
            "UPDATE holdings SET status = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(i16::from(status))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Holding with id {} not found", id)))
    }

    /// Delete a holding
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM holdings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Holding with id {} not found", id)));
        }
        Ok(())
    }
}
