//! Reproduction standard options repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{standard_option::CreateStandardOption, ReproductionStandardOption},
};

#[derive(Clone)]
pub struct StandardOptionsRepository {
    pool: Pool<Postgres>,
}

impl StandardOptionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List options, optionally only the enabled ones
    pub async fn list(&self, enabled_only: bool) -> AppResult<Vec<ReproductionStandardOption>> {
        let rows = sqlx::query_as::<_, ReproductionStandardOption>(
            r#"
            SELECT * FROM reproduction_standard_options
            WHERE ($1 = FALSE OR enabled = TRUE)
            ORDER BY material_type, level, id
            "#,
        )
        .bind(enabled_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ReproductionStandardOption> {
        sqlx::query_as::<_, ReproductionStandardOption>(
            "SELECT * FROM reproduction_standard_options WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Standard option {} not found", id)))
    }

    pub async fn create(&self, data: &CreateStandardOption) -> AppResult<ReproductionStandardOption> {
        let row = sqlx::query_as::<_, ReproductionStandardOption>(
            r#"
            INSERT INTO reproduction_standard_options
                (material_type, level, option_name_en, option_name_nl,
                 option_description_en, option_description_nl, price, delivery_time, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING *
            "#,
        )
        .bind(&data.material_type)
        .bind(i16::from(data.level))
        .bind(&data.option_name_en)
        .bind(&data.option_name_nl)
        .bind(&data.option_description_en)
        .bind(&data.option_description_nl)
        .bind(data.price)
        .bind(data.delivery_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Enable or disable an option
    pub async fn set_enabled(&self, id: i32, enabled: bool) -> AppResult<ReproductionStandardOption> {
        sqlx::query_as::<_, ReproductionStandardOption>(
            "UPDATE reproduction_standard_options SET enabled = $1 WHERE id = $2 RETURNING *",
        )
        .bind(enabled)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Standard option {} not found", id)))
    }
}
