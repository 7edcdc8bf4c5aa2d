//! Staging load: object storage → staging table via warehouse COPY.

use snafu::ResultExt;
use tracing::info;

use crate::config::{StageConfig, StorageConfig};
use crate::emit;
use crate::error::{CopySnafu, LoadError, NullCleanupSnafu, TruncateSnafu};
use crate::metrics::events::{NullRowsRemoved, StagingCleared, StagingCopied};
use crate::source::resolve_source_path;
use crate::sql::{clear_statement, copy_statement, null_cleanup_statement};
use crate::warehouse::Warehouse;

use super::RunContext;

/// Loads one staging table: clear, COPY from object storage, then delete
/// rows whose key columns are null.
///
/// The load is idempotent per run: the table is fully replaced, so re-running
/// a failed task converges on the same state. Any step failing aborts the
/// task - downstream fact and dimension loads depend on the staging table
/// holding zero null-key rows.
pub struct StageTask {
    table: String,
    config: StageConfig,
    storage: StorageConfig,
    backfill_threshold: chrono::Duration,
}

impl StageTask {
    pub fn new(
        table: impl Into<String>,
        config: StageConfig,
        storage: StorageConfig,
        backfill_threshold: chrono::Duration,
    ) -> Self {
        Self {
            table: table.into(),
            config,
            storage,
            backfill_threshold,
        }
    }

    /// The staging table this task loads.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn run(
        &self,
        warehouse: &dyn Warehouse,
        run: &RunContext,
    ) -> Result<(), LoadError> {
        let cleared = warehouse
            .execute(&clear_statement(&self.table))
            .await
            .context(TruncateSnafu { table: &self.table })?;
        emit!(StagingCleared {
            table: self.table.clone(),
            rows: cleared,
        });

        let path = resolve_source_path(
            &self.config.bucket,
            &self.config.key_template,
            self.config.layout,
            self.config.format,
            run.logical,
            run.now,
            self.backfill_threshold,
        );

        // Log the path and table only; the COPY statement itself embeds
        // credentials and must never reach the logs.
        info!(
            table = %self.table,
            path = %path,
            "Copying data from object storage into staging table"
        );

        let copy = copy_statement(
            &self.table,
            &path,
            &self.storage.access_key_id,
            &self.storage.secret_access_key,
            &self.config.format.format_spec(self.config.jsonpaths.as_deref()),
            &self.storage.region,
        );
        warehouse.execute(&copy).await.context(CopySnafu {
            table: &self.table,
            path: &path,
        })?;
        emit!(StagingCopied {
            table: self.table.clone(),
        });

        let mut removed = 0;
        for column in &self.config.key_columns {
            removed += warehouse
                .execute(&null_cleanup_statement(&self.table, column))
                .await
                .context(NullCleanupSnafu {
                    table: &self.table,
                    column,
                })?;
        }
        emit!(NullRowsRemoved {
            table: self.table.clone(),
            rows: removed,
        });
        info!(
            table = %self.table,
            rows = removed,
            "Removed rows with null key columns"
        );

        Ok(())
    }
}
