//! Dimension table load: replace (truncate + insert) or append.

use std::sync::Arc;

use snafu::{OptionExt, ResultExt};
use tracing::info;

use crate::emit;
use crate::error::{InsertSnafu, LoadError, TruncateSnafu, UnknownStatementSnafu};
use crate::metrics::events::{LoadMode, TableLoaded};
use crate::sql::{truncate_statement, StatementCatalog};
use crate::warehouse::Warehouse;

/// Populates one dimension table from a named catalog statement.
///
/// With `append == false` the table is truncated first, so after the load it
/// reflects only rows derivable from the current staged data. TRUNCATE
/// commits immediately on Redshift-style warehouses, so readers can observe
/// an empty table between the two statements. With `append == true` rows are
/// inserted without truncation and without deduplication.
pub struct DimensionTask {
    table: String,
    statement: String,
    append: bool,
    catalog: Arc<StatementCatalog>,
}

impl DimensionTask {
    pub fn new(
        table: impl Into<String>,
        statement: impl Into<String>,
        append: bool,
        catalog: Arc<StatementCatalog>,
    ) -> Self {
        Self {
            table: table.into(),
            statement: statement.into(),
            append,
            catalog,
        }
    }

    /// The dimension table this task loads.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn run(&self, warehouse: &dyn Warehouse) -> Result<(), LoadError> {
        let sql = self
            .catalog
            .get(&self.statement)
            .context(UnknownStatementSnafu {
                name: &self.statement,
            })?;

        let mode = if self.append {
            LoadMode::Append
        } else {
            warehouse
                .execute(&truncate_statement(&self.table))
                .await
                .context(TruncateSnafu { table: &self.table })?;
            LoadMode::Replace
        };

        info!(
            table = %self.table,
            statement = %self.statement,
            append = self.append,
            "Loading dimension table"
        );
        warehouse.execute(sql).await.context(InsertSnafu {
            table: &self.table,
            statement: &self.statement,
        })?;
        emit!(TableLoaded {
            table: self.table.clone(),
            mode,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::MockWarehouse;

    fn task(append: bool) -> DimensionTask {
        DimensionTask::new(
            "songs",
            "song_table_insert",
            append,
            Arc::new(StatementCatalog::sparkify()),
        )
    }

    #[tokio::test]
    async fn test_replace_truncates_before_insert() {
        let warehouse = MockWarehouse::new();
        task(false).run(&warehouse).await.unwrap();

        let executed = warehouse.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[0], "TRUNCATE songs");
        assert!(executed[1].starts_with("INSERT INTO songs"));
    }

    #[tokio::test]
    async fn test_replace_twice_truncates_each_run() {
        let warehouse = MockWarehouse::new();
        let task = task(false);
        task.run(&warehouse).await.unwrap();
        task.run(&warehouse).await.unwrap();

        // Each run re-truncates, so the table only ever holds the rows of
        // the most recent insert.
        assert_eq!(warehouse.count_matching("TRUNCATE songs"), 2);
        assert_eq!(warehouse.count_matching("INSERT INTO songs"), 2);
    }

    #[tokio::test]
    async fn test_append_never_truncates() {
        let warehouse = MockWarehouse::new();
        let task = task(true);
        task.run(&warehouse).await.unwrap();
        task.run(&warehouse).await.unwrap();

        assert_eq!(warehouse.count_matching("TRUNCATE"), 0);
        assert_eq!(warehouse.count_matching("INSERT INTO songs"), 2);
    }

    #[tokio::test]
    async fn test_truncate_failure_skips_insert() {
        let warehouse = MockWarehouse::new();
        warehouse.fail_matching("TRUNCATE songs");
        let err = task(false).run(&warehouse).await.unwrap_err();
        assert!(matches!(err, LoadError::Truncate { .. }));
        assert_eq!(warehouse.count_matching("INSERT"), 0);
    }
}
