//! Snowmelt: batch ETL from object storage into a warehouse star schema.
//!
//! This crate handles:
//! - Staging raw event and song logs into warehouse tables via bulk COPY,
//!   with backfill-aware source path resolution
//! - Cleaning staged rows whose key columns are null
//! - Loading one fact table and four dimension tables from a fixed
//!   statement catalog (replace or append semantics per dimension)
//! - Row-count data-quality checks over the loaded tables
//!
//! Scheduling, retries, and credential storage belong to whatever invokes
//! the binary; one invocation is one pipeline run.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod source;
pub mod sql;
pub mod tasks;
pub mod warehouse;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config::Config;
pub use error::PipelineError;
pub use logging::init_tracing;
pub use metrics::init_metrics;
pub use sql::StatementCatalog;
pub use tasks::{EtlPipeline, RunContext};
pub use warehouse::{MockWarehouse, PostgresWarehouse, Warehouse};
