//! Data-quality checks: row-count assertions over loaded tables.

use snafu::{ensure, OptionExt, ResultExt};
use tracing::{error, info};

use crate::emit;
use crate::error::{NoResultSnafu, QualityError, QuerySnafu, ZeroRowsSnafu};
use crate::metrics::events::{QualityCheckFailed, QualityCheckPassed};
use crate::sql::count_statement;
use crate::warehouse::Warehouse;

/// Runs `SELECT COUNT(*)` against each table in order and fails the run if
/// any table returns no result or zero rows.
///
/// Checks fail fast: the first offending table aborts the task and later
/// tables are not queried. (Aggregating all failures instead is a candidate
/// improvement; the fail-fast behavior is deliberate and preserved.)
pub struct QualityTask {
    tables: Vec<String>,
}

impl QualityTask {
    pub fn new(tables: Vec<String>) -> Self {
        Self { tables }
    }

    /// The tables checked, in order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub async fn run(&self, warehouse: &dyn Warehouse) -> Result<(), QualityError> {
        for table in &self.tables {
            if let Err(e) = self.check_table(warehouse, table).await {
                error!(table = %table, reason = e.reason(), "Data quality check failed");
                emit!(QualityCheckFailed {
                    table: table.clone(),
                    reason: e.reason(),
                });
                return Err(e);
            }
        }
        Ok(())
    }

    async fn check_table(
        &self,
        warehouse: &dyn Warehouse,
        table: &str,
    ) -> Result<(), QualityError> {
        let rows = warehouse
            .query_counts(&count_statement(table))
            .await
            .context(QuerySnafu { table })?;

        let first = rows.first().context(NoResultSnafu { table })?;
        let count = *first.first().context(NoResultSnafu { table })?;
        ensure!(count > 0, ZeroRowsSnafu { table });

        info!(table = %table, rows = count, "Data quality check passed");
        emit!(QualityCheckPassed {
            table: table.to_string(),
            rows: count,
        });
        Ok(())
    }
}
