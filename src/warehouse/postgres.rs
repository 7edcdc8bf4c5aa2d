//! Postgres-wire warehouse implementation.
//!
//! Redshift and friends speak the postgres wire protocol, so a single sqlx
//! `PgPool` covers both local postgres (tests, development) and the real
//! warehouse. The pool is constructed lazily; no connection is made until
//! the first statement runs.

use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::config::WarehouseConfig;
use crate::error::{ConnectSnafu, DecodeSnafu, StatementSnafu, WarehouseError};

use super::Warehouse;

/// sqlx-backed [`Warehouse`] over a postgres-wire connection pool.
pub struct PostgresWarehouse {
    pool: PgPool,
}

impl PostgresWarehouse {
    /// Build a lazily-connecting pool from configuration.
    pub fn connect_lazy(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.url)
            .context(ConnectSnafu)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Warehouse for PostgresWarehouse {
    async fn execute(&self, sql: &str) -> Result<u64, WarehouseError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .context(StatementSnafu)?;
        Ok(result.rows_affected())
    }

    async fn query_counts(&self, sql: &str) -> Result<Vec<Vec<i64>>, WarehouseError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .context(StatementSnafu)?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|column| row.try_get::<i64, _>(column).context(DecodeSnafu { column }))
                    .collect()
            })
            .collect()
    }
}
