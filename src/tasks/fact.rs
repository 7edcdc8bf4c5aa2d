//! Fact table load: one fixed INSERT..SELECT from the statement catalog.

use std::sync::Arc;

use snafu::{OptionExt, ResultExt};
use tracing::info;

use crate::emit;
use crate::error::{InsertSnafu, LoadError, UnknownStatementSnafu};
use crate::metrics::events::{LoadMode, TableLoaded};
use crate::sql::StatementCatalog;
use crate::warehouse::Warehouse;

/// Populates the fact table by executing a named catalog statement verbatim.
///
/// No parameters, no transactional wrapping beyond the single statement.
/// Failure is fatal and non-retryable at this layer.
pub struct FactTask {
    table: String,
    statement: String,
    catalog: Arc<StatementCatalog>,
}

impl FactTask {
    pub fn new(
        table: impl Into<String>,
        statement: impl Into<String>,
        catalog: Arc<StatementCatalog>,
    ) -> Self {
        Self {
            table: table.into(),
            statement: statement.into(),
            catalog,
        }
    }

    /// The fact table this task loads.
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

        info!(table = %self.table, statement = %self.statement, "Loading fact table");
        warehouse.execute(sql).await.context(InsertSnafu {
            table: &self.table,
            statement: &self.statement,
        })?;
        emit!(TableLoaded {
            table: self.table.clone(),
            mode: LoadMode::Fact,
        });
        Ok(())
    }
}
