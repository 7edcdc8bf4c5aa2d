//! Warehouse access layer.
//!
//! The pipeline talks to the warehouse through the [`Warehouse`] trait: a
//! thin abstraction over a relational connection that executes statements
//! and answers count queries. The production implementation is
//! [`PostgresWarehouse`]; [`MockWarehouse`] records statements for tests.

mod mock;
mod postgres;

pub use mock::MockWarehouse;
pub use postgres::PostgresWarehouse;

use async_trait::async_trait;

use crate::error::WarehouseError;

/// Executes SQL against the warehouse.
///
/// Implementations are expected to be cheap to share (`&dyn Warehouse` is
/// passed around freely) and to surface every failure; the pipeline never
/// retries at this layer.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a statement, returning the number of affected rows.
    async fn execute(&self, sql: &str) -> Result<u64, WarehouseError>;

    /// Run a query whose result columns are all integers (count probes),
    /// returning the rows in order.
    async fn query_counts(&self, sql: &str) -> Result<Vec<Vec<i64>>, WarehouseError>;
}
