//! Pipeline tasks and their fixed execution graph.
//!
//! One run executes four task levels in order:
//!
//! ```text
//! {stage × N}  →  load_fact  →  {load_dimension × M}  →  quality_checks
//! ```
//!
//! Tasks within a level touch distinct tables and are awaited concurrently;
//! levels are strictly ordered so the fact load sees fully staged and
//! cleaned data, and quality checks run only after every dimension load
//! completes. Scheduling, retries, and cancellation belong to whatever
//! invokes the run.

mod dimension;
mod fact;
mod quality;
mod stage;

pub use dimension::DimensionTask;
pub use fact::FactTask;
pub use quality::QualityTask;
pub use stage::StageTask;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use tracing::info;

use crate::config::Config;
use crate::emit;
use crate::error::{ConfigError, PipelineError};
use crate::metrics::events::TaskCompleted;
use crate::sql::StatementCatalog;
use crate::warehouse::Warehouse;

/// Timestamps for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    /// The logical execution timestamp supplied by the scheduler; drives
    /// key-template rendering and the backfill decision.
    pub logical: DateTime<Utc>,
    /// Wall-clock time the run started.
    pub now: DateTime<Utc>,
}

impl RunContext {
    /// A run context for the given logical timestamp, starting now.
    pub fn new(logical: DateTime<Utc>) -> Self {
        Self {
            logical,
            now: Utc::now(),
        }
    }
}

/// One fully-wired pipeline run: staging loads, fact load, dimension loads,
/// and quality checks over a shared warehouse.
pub struct EtlPipeline {
    warehouse: Arc<dyn Warehouse>,
    stages: Vec<StageTask>,
    fact: FactTask,
    dimensions: Vec<DimensionTask>,
    quality: QualityTask,
}

impl EtlPipeline {
    /// Wire up a pipeline from configuration, validating it against the
    /// statement catalog first.
    pub fn from_config(
        config: &Config,
        catalog: StatementCatalog,
        warehouse: Arc<dyn Warehouse>,
    ) -> Result<Self, ConfigError> {
        config.validate(&catalog)?;
        let catalog = Arc::new(catalog);
        let threshold = Duration::hours(config.backfill_threshold_hours);

        let stages = config
            .stages
            .iter()
            .map(|(table, stage)| {
                StageTask::new(table, stage.clone(), config.storage.clone(), threshold)
            })
            .collect();

        let fact = FactTask::new(&config.fact.table, &config.fact.statement, catalog.clone());

        let dimensions = config
            .dimensions
            .iter()
            .map(|(table, dim)| {
                DimensionTask::new(table, &dim.statement, dim.append, catalog.clone())
            })
            .collect();

        let quality = QualityTask::new(config.quality.tables.clone());

        Ok(Self {
            warehouse,
            stages,
            fact,
            dimensions,
            quality,
        })
    }

    /// The task graph as ordered levels of task names. Execution follows
    /// exactly this declaration.
    pub fn plan(&self) -> Vec<Vec<String>> {
        vec![
            self.stages
                .iter()
                .map(|s| format!("stage:{}", s.table()))
                .collect(),
            vec![format!("load_fact:{}", self.fact.table())],
            self.dimensions
                .iter()
                .map(|d| format!("load_dimension:{}", d.table()))
                .collect(),
            vec!["quality_checks".to_string()],
        ]
    }

    /// Execute one run: every level in order, tasks within a level
    /// concurrently. The first failure aborts the run.
    pub async fn run(&self, run: &RunContext) -> Result<(), PipelineError> {
        info!(
            logical = %run.logical,
            plan = ?self.plan(),
            "Starting pipeline run"
        );

        try_join_all(self.stages.iter().map(|stage| {
            timed(format!("stage:{}", stage.table()), async {
                stage.run(self.warehouse.as_ref(), run).await
            })
        }))
        .await?;

        timed(format!("load_fact:{}", self.fact.table()), async {
            self.fact.run(self.warehouse.as_ref()).await
        })
        .await?;

        try_join_all(self.dimensions.iter().map(|dimension| {
            timed(format!("load_dimension:{}", dimension.table()), async {
                dimension.run(self.warehouse.as_ref()).await
            })
        }))
        .await?;

        timed("quality_checks".to_string(), async {
            self.quality.run(self.warehouse.as_ref()).await
        })
        .await?;

        info!("Pipeline run complete");
        Ok(())
    }
}

/// Await a task future and record its duration, success or failure.
async fn timed<T, E>(
    task: String,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let start = Instant::now();
    let result = fut.await;
    emit!(TaskCompleted {
        task,
        duration: start.elapsed(),
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
warehouse:
  url: "postgres://localhost:5439/sparkify"
storage:
  region: us-west-2
  access_key_id: AKIA123
  secret_access_key: secret456
stages:
  staging_events:
    bucket: udacity-dend
    key_template: log-data
    layout: partitioned
    key_columns: [userid, sessionid, ts]
  staging_songs:
    bucket: udacity-dend
    key_template: song-data/A
    key_columns: [song_id, artist_id]
fact:
  table: songplays
  statement: songplay_table_insert
dimensions:
  songs:
    statement: song_table_insert
  users:
    statement: user_table_insert
  artists:
    statement: artist_table_insert
  time:
    statement: time_table_insert
quality:
  tables: [songplays, songs, users, artists, time]
"#;

    #[test]
    fn test_plan_declares_fixed_ordering() {
        let config = Config::parse(YAML).unwrap();
        let pipeline = EtlPipeline::from_config(
            &config,
            StatementCatalog::sparkify(),
            Arc::new(crate::warehouse::MockWarehouse::new()),
        )
        .unwrap();

        let plan = pipeline.plan();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0], vec!["stage:staging_events", "stage:staging_songs"]);
        assert_eq!(plan[1], vec!["load_fact:songplays"]);
        assert_eq!(
            plan[2],
            vec![
                "load_dimension:songs",
                "load_dimension:users",
                "load_dimension:artists",
                "load_dimension:time",
            ]
        );
        assert_eq!(plan[3], vec!["quality_checks"]);
    }

    #[test]
    fn test_from_config_rejects_bad_statement() {
        let mut config = Config::parse(YAML).unwrap();
        config.fact.statement = "nope".to_string();
        let result = EtlPipeline::from_config(
            &config,
            StatementCatalog::sparkify(),
            Arc::new(crate::warehouse::MockWarehouse::new()),
        );
        assert!(result.is_err());
    }
}
