//! Reproductions repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        reproduction::ActiveConflict, Holding, HoldingReproduction, HoldingStatus, NewReproduction,
        Reproduction, ReproductionStatus,
    },
    services::lifecycle::{ReproductionQuery, ReproductionStore},
};

#[derive(Clone)]
pub struct ReproductionsRepository {
    pool: Pool<Postgres>,
}

impl ReproductionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reproduction by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reproduction> {
        sqlx::query_as::<_, Reproduction>("SELECT * FROM reproductions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reproduction with id {} not found", id)))
    }

    /// Line items of a reproduction
    pub async fn holding_reproductions(&self, reproduction_id: i32) -> AppResult<Vec<HoldingReproduction>> {
        let rows = sqlx::query_as::<_, HoldingReproduction>(
            "SELECT * FROM holding_reproductions WHERE reproduction_id = $1 ORDER BY id",
        )
        .bind(reproduction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a reproduction and its line items, without any availability check
    pub async fn add(
        &self,
        data: &NewReproduction,
        status: ReproductionStatus,
        default_btw_percentage: i32,
    ) -> AppResult<Reproduction> {
        let mut tx = self.pool.begin().await?;
        let reproduction = insert_with_lines(&mut tx, data, status, default_btw_percentage).await?;
        tx.commit().await?;
        Ok(reproduction)
    }

    /// Insert a reproduction unless one of its holdings already has an active one.
    ///
    /// The holding rows are locked for the duration of the transaction, so two
    /// concurrent requests for the same holding are serialised here.
    pub async fn add_guarded(
        &self,
        data: &NewReproduction,
        status: ReproductionStatus,
        default_btw_percentage: i32,
    ) -> AppResult<Reproduction> {
        let holding_ids: Vec<i32> = data.holdings.iter().map(|hr| hr.holding_id).collect();

        let mut tx = self.pool.begin().await?;

        let locked: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM holdings WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&holding_ids)
        .fetch_all(&mut *tx)
        .await?;

        let missing: Vec<String> = holding_ids
            .iter()
            .filter(|id| !locked.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!("Holdings not found: {}", missing.join(", "))));
        }

        let claimed: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT hr.holding_id
            FROM holding_reproductions hr
            JOIN reproductions r ON r.id = hr.reproduction_id
            WHERE hr.holding_id = ANY($1) AND r.status = ANY($2)
            ORDER BY hr.holding_id
            "#,
        )
        .bind(&holding_ids)
        .bind(ReproductionStatus::active_codes())
        .fetch_all(&mut *tx)
        .await?;

        if !claimed.is_empty() {
            let ids: Vec<String> = claimed.iter().map(|id| id.to_string()).collect();
            return Err(AppError::Conflict(format!(
                "Holdings already have an active reproduction: {}",
                ids.join(", ")
            )));
        }

        let reproduction = insert_with_lines(&mut tx, data, status, default_btw_percentage).await?;

        sqlx::query(
            "UPDATE holdings SET status = $1, modif_date = $2 WHERE id = ANY($3) AND status = $4",
        )
        .bind(i16::from(HoldingStatus::Reserved))
        .bind(Utc::now())
        .bind(&holding_ids)
        .bind(i16::from(HoldingStatus::Available))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reproduction)
    }

    /// Save the customer-facing fields of a reproduction.
    ///
    /// Status and its dates are left as stored; they only change through
    /// `advance_status` and `mark_item`.
    pub async fn save(&self, reproduction: &Reproduction) -> AppResult<Reproduction> {
        sqlx::query_as::<_, Reproduction>(
            r#"
            UPDATE reproductions
            SET customer_name = $1, customer_email = $2, discount_percentage = $3, comment = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&reproduction.customer_name)
        .bind(&reproduction.customer_email)
        .bind(reproduction.discount_percentage)
        .bind(&reproduction.comment)
        .bind(reproduction.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reproduction with id {} not found", reproduction.id)))
    }

    /// Move a reproduction forward to `status`.
    ///
    /// Backward or same-status moves are ignored and return `false`. Entering a
    /// terminal status completes the line items and frees reserved holdings.
    pub async fn advance_status(
        &self,
        id: i32,
        status: ReproductionStatus,
    ) -> AppResult<(Reproduction, bool)> {
        let mut tx = self.pool.begin().await?;

        let mut reproduction = sqlx::query_as::<_, Reproduction>(
            "SELECT * FROM reproductions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reproduction with id {} not found", id)))?;

        if !reproduction.advance_to(status, Utc::now()) {
            return Ok((reproduction, false));
        }

        let reproduction = update_reproduction(&mut tx, &reproduction).await?;

        if status.is_terminal() {
            sqlx::query("UPDATE holding_reproductions SET completed = TRUE WHERE reproduction_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            release_reserved_holdings(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok((reproduction, true))
    }

    /// Mark a holding at the desk, moving it one step along
    /// Reserved → InUse → Returned → Available.
    ///
    /// When `reproduction_id` is given, its line items whose holding is back
    /// on the shelf are completed, and the reproduction itself becomes
    /// `Completed` once no open line item remains.
    pub async fn mark_item(
        &self,
        holding_id: i32,
        reproduction_id: Option<i32>,
    ) -> AppResult<(Holding, Option<Reproduction>)> {
        let mut tx = self.pool.begin().await?;

        let holding = sqlx::query_as::<_, Holding>("SELECT * FROM holdings WHERE id = $1 FOR UPDATE")
            .bind(holding_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Holding with id {} not found", holding_id)))?;

        let holding = sqlx::query_as::<_, Holding>(
            "UPDATE holdings SET status = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(i16::from(holding.status.next_marked()))
        .bind(Utc::now())
        .bind(holding_id)
        .fetch_one(&mut *tx)
        .await?;

        let Some(reproduction_id) = reproduction_id else {
            tx.commit().await?;
            return Ok((holding, None));
        };

        let mut reproduction = sqlx::query_as::<_, Reproduction>(
            "SELECT * FROM reproductions WHERE id = $1 FOR UPDATE",
        )
        .bind(reproduction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reproduction with id {} not found", reproduction_id)))?;

        sqlx::query(
            r#"
            UPDATE holding_reproductions hr SET completed = TRUE
            FROM holdings h
            WHERE hr.reproduction_id = $1 AND h.id = hr.holding_id
              AND h.status = $2 AND NOT hr.completed
            "#,
        )
        .bind(reproduction_id)
        .bind(i16::from(HoldingStatus::Available))
        .execute(&mut *tx)
        .await?;

        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM holding_reproductions WHERE reproduction_id = $1 AND NOT completed",
        )
        .bind(reproduction_id)
        .fetch_one(&mut *tx)
        .await?;

        if open == 0 && reproduction.advance_to(ReproductionStatus::Completed, Utc::now()) {
            reproduction = update_reproduction(&mut tx, &reproduction).await?;
            release_reserved_holdings(&mut tx, reproduction_id).await?;
        }

        tx.commit().await?;
        Ok((holding, Some(reproduction)))
    }

    /// Remove a reproduction. Unknown ids are ignored.
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let status: Option<i16> = sqlx::query_scalar(
            "SELECT status FROM reproductions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(status) = status else {
            return Ok(());
        };

        let status = ReproductionStatus::try_from(status).map_err(|e| AppError::Internal(e.to_string()))?;
        if status.is_active() {
            release_reserved_holdings(&mut tx, id).await?;
        }

        sqlx::query("DELETE FROM reproductions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Holdings referenced by more than one in-progress reproduction
    pub async fn active_conflicts(&self) -> AppResult<Vec<ActiveConflict>> {
        let rows = sqlx::query_as::<_, ActiveConflict>(
            r#"
            SELECT hr.holding_id, array_agg(r.id ORDER BY r.id) AS reproduction_ids
            FROM holding_reproductions hr
            JOIN reproductions r ON r.id = hr.reproduction_id
            WHERE r.status = ANY($1)
            GROUP BY hr.holding_id
            HAVING COUNT(*) > 1
            ORDER BY hr.holding_id
            "#,
        )
        .bind(ReproductionStatus::active_codes())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ReproductionStore for ReproductionsRepository {
    async fn list(&self, query: &ReproductionQuery) -> AppResult<Vec<Reproduction>> {
        let rows = sqlx::query_as::<_, Reproduction>(
            r#"
            SELECT r.* FROM reproductions r
            WHERE EXISTS (
                SELECT 1 FROM holding_reproductions hr
                WHERE hr.reproduction_id = r.id AND hr.holding_id = $1
            )
              AND ($2::smallint[] IS NULL OR r.status = ANY($2))
            ORDER BY r.creation_date, r.id
            LIMIT $3
            "#,
        )
        .bind(query.holding_id)
        .bind(query.status_codes())
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self, query: &ReproductionQuery) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM holding_reproductions hr
            JOIN reproductions r ON r.id = hr.reproduction_id
            WHERE hr.holding_id = $1
              AND ($2::smallint[] IS NULL OR r.status = ANY($2))
            "#,
        )
        .bind(query.holding_id)
        .bind(query.status_codes())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

async fn insert_with_lines(
    conn: &mut PgConnection,
    data: &NewReproduction,
    status: ReproductionStatus,
    default_btw_percentage: i32,
) -> AppResult<Reproduction> {
    let now = Utc::now();
    let order_details_date = (status >= ReproductionStatus::HasOrderDetails).then_some(now);

    let reproduction = sqlx::query_as::<_, Reproduction>(
        r#"
        INSERT INTO reproductions
            (customer_name, customer_email, status, creation_date,
             date_has_order_details, discount_percentage, comment)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&data.customer_name)
    .bind(&data.customer_email)
    .bind(i16::from(status))
    .bind(now)
    .bind(order_details_date)
    .bind(data.discount_percentage.unwrap_or(0))
    .bind(&data.comment)
    .fetch_one(&mut *conn)
    .await?;

    for hr in &data.holdings {
        sqlx::query(
            r#"
            INSERT INTO holding_reproductions
                (reproduction_id, holding_id, standard_option_id, custom_reproduction_customer,
                 price, number_of_pages, delivery_time, btw_percentage, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(reproduction.id)
        .bind(hr.holding_id)
        .bind(hr.standard_option_id)
        .bind(&hr.custom_reproduction_customer)
        .bind(hr.scaled_price())
        .bind(hr.number_of_pages.unwrap_or(1))
        .bind(hr.delivery_time)
        .bind(hr.btw_percentage.unwrap_or(default_btw_percentage))
        .bind(&hr.comment)
        .execute(&mut *conn)
        .await?;
    }

    Ok(reproduction)
}

async fn update_reproduction(conn: &mut PgConnection, reproduction: &Reproduction) -> AppResult<Reproduction> {
    sqlx::query_as::<_, Reproduction>(
        r#"
        UPDATE reproductions
        SET customer_name = $1, customer_email = $2, status = $3,
            date_has_order_details = $4, date_payment_accepted = $5,
            discount_percentage = $6, comment = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&reproduction.customer_name)
    .bind(&reproduction.customer_email)
    .bind(i16::from(reproduction.status))
    .bind(reproduction.date_has_order_details)
    .bind(reproduction.date_payment_accepted)
    .bind(reproduction.discount_percentage)
    .bind(&reproduction.comment)
    .bind(reproduction.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Reproduction with id {} not found", reproduction.id)))
}

async fn release_reserved_holdings(conn: &mut PgConnection, reproduction_id: i32) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE holdings SET status = $1, modif_date = $2
        WHERE status = $3
          AND id IN (SELECT holding_id FROM holding_reproductions WHERE reproduction_id = $4)
        "#,
    )
    .bind(i16::from(HoldingStatus::Available))
    .bind(Utc::now())
    .bind(i16::from(HoldingStatus::Reserved))
    .bind(reproduction_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
