//! Internal events for metrics emission.
//!
//! Each event struct represents a measurable occurrence in the pipeline and
//! emits the corresponding Prometheus metric through the `InternalEvent`
//! trait. All metrics carry a `table` label so multi-table runs stay
//! observable per table.

use metrics::{counter, histogram};
use std::time::Duration;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Event emitted when a staging table is cleared before a load.
pub struct StagingCleared {
    pub table: String,
    pub rows: u64,
}

impl InternalEvent for StagingCleared {
    fn emit(self) {
        trace!(table = %self.table, rows = self.rows, "Staging table cleared");
        counter!("snowmelt_staging_rows_cleared_total", "table" => self.table).increment(self.rows);
    }
}

/// Event emitted when a bulk COPY into a staging table completes.
pub struct StagingCopied {
    pub table: String,
}

impl InternalEvent for StagingCopied {
    fn emit(self) {
        trace!(table = %self.table, "Staging copy completed");
        counter!("snowmelt_staging_copies_total", "table" => self.table).increment(1);
    }
}

/// Event emitted when post-load cleanup removes rows with null key columns.
pub struct NullRowsRemoved {
    pub table: String,
    pub rows: u64,
}

impl InternalEvent for NullRowsRemoved {
    fn emit(self) {
        trace!(table = %self.table, rows = self.rows, "Null key rows removed");
        counter!("snowmelt_null_rows_removed_total", "table" => self.table).increment(self.rows);
    }
}

/// How a fact or dimension table was loaded.
#[derive(Debug, Clone, Copy)]
pub enum LoadMode {
    Fact,
    Replace,
    Append,
}

impl LoadMode {
    fn as_str(&self) -> &'static str {
        match self {
            LoadMode::Fact => "fact",
            LoadMode::Replace => "replace",
            LoadMode::Append => "append",
        }
    }
}

/// Event emitted when a fact or dimension load completes.
pub struct TableLoaded {
    pub table: String,
    pub mode: LoadMode,
}

impl InternalEvent for TableLoaded {
    fn emit(self) {
        trace!(table = %self.table, mode = self.mode.as_str(), "Table loaded");
        counter!(
            "snowmelt_tables_loaded_total",
            "table" => self.table,
            "mode" => self.mode.as_str()
        )
        .increment(1);
    }
}

/// Event emitted when a table passes its row-count quality check.
pub struct QualityCheckPassed {
    pub table: String,
    pub rows: i64,
}

impl InternalEvent for QualityCheckPassed {
    fn emit(self) {
        trace!(table = %self.table, rows = self.rows, "Quality check passed");
        counter!(
            "snowmelt_quality_checks_total",
            "table" => self.table,
            "status" => "passed"
        )
        .increment(1);
    }
}

/// Event emitted when a table fails its row-count quality check.
pub struct QualityCheckFailed {
    pub table: String,
    pub reason: &'static str,
}

impl InternalEvent for QualityCheckFailed {
    fn emit(self) {
        trace!(table = %self.table, reason = self.reason, "Quality check failed");
        counter!(
            "snowmelt_quality_checks_total",
            "table" => self.table,
            "status" => "failed"
        )
        .increment(1);
    }
}

/// Event emitted when a pipeline task finishes, successfully or not.
pub struct TaskCompleted {
    pub task: String,
    pub duration: Duration,
}

impl InternalEvent for TaskCompleted {
    fn emit(self) {
        trace!(task = %self.task, secs = self.duration.as_secs_f64(), "Task completed");
        histogram!("snowmelt_task_duration_seconds", "task" => self.task)
            .record(self.duration.as_secs_f64());
    }
}
