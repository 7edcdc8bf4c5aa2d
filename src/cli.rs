//! Command-line arguments for the snowmelt binary.

use chrono::{DateTime, Utc};
use clap::Parser;

/// Batch ETL: stage object-storage logs into a warehouse star schema.
#[derive(Debug, Parser)]
#[command(name = "snowmelt", version, about)]
pub struct CliArgs {
    /// Path to the pipeline configuration file.
    #[arg(short, long, default_value = "snowmelt.yaml")]
    pub config: String,

    /// Logical execution timestamp (RFC 3339). A scheduler passes the slot
    /// being processed; defaults to now.
    #[arg(long, value_parser = parse_rfc3339)]
    pub logical_date: Option<DateTime<Utc>>,
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
