//! Repository layer for database operations

pub mod holdings;
pub mod reproductions;
pub mod standard_options;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub holdings: holdings::HoldingsRepository,
    pub reproductions: reproductions::ReproductionsRepository,
    pub standard_options: standard_options::StandardOptionsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            holdings: holdings::HoldingsRepository::new(pool.clone()),
            reproductions: reproductions::ReproductionsRepository::new(pool.clone()),
            standard_options: standard_options::StandardOptionsRepository::new(pool.clone()),
            pool,
        }
    }
}
