//! Postgres-backed stores.
//!
//! One `PostgresDatabase` implements every store trait over a shared SQLx
//! pool. Uniqueness, cascades and delete restrictions are enforced by the
//! schema in `migrations/0001_init.sql`.

mod associations;
mod catalog;
mod error;
mod sales;

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use gameshop_core::StoreError;

pub(crate) use error::map_sqlx_error;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Postgres implementation of the catalog, association and sale stores.
///
/// `Send + Sync`; every operation borrows a connection from the pool.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let db = Self::new(pool);
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded schema. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        info!("database schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
