//! Object-storage source path resolution.
//!
//! A staging load reads from one of two path shapes:
//!
//! - **Flat**: `s3://<bucket>/<rendered_key>` - the normal hourly run.
//! - **Partitioned**: `s3://<bucket>/<rendered_key>/<YYYY>/<MM>/<YYYY>-<MM>-<DD>-events.json`
//!   - used when the run is a backfill, i.e. the logical timestamp is older
//!   than the configured threshold relative to wall-clock time, and the
//!   source lays its files out in a year/month hierarchy.
//!
//! The layout is an explicit per-stage config choice; nothing here inspects
//! table names.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How source files are laid out in the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathLayout {
    /// Single prefix, no date hierarchy.
    #[default]
    Flat,
    /// Year/month hierarchy with per-day files; backfill runs resolve into it.
    Partitioned,
}

/// Data format passed to the warehouse bulk COPY.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFormat {
    /// JSON, optionally with a path-mapping spec (jsonpaths).
    #[default]
    Json,
    /// Auto-detected columnar files.
    Parquet,
    /// Auto-detected delimited files.
    Csv,
}

impl CopyFormat {
    /// Render the `FORMAT AS` clause body, e.g. `JSON 'auto'` or
    /// `JSON 's3://bucket/paths.json'`.
    pub fn format_spec(self, jsonpaths: Option<&str>) -> String {
        match (self, jsonpaths) {
            (CopyFormat::Json, Some(paths)) => format!("JSON '{paths}'"),
            (CopyFormat::Json, None) => "JSON 'auto'".to_string(),
            (CopyFormat::Parquet, _) => "PARQUET 'auto'".to_string(),
            (CopyFormat::Csv, _) => "CSV 'auto'".to_string(),
        }
    }

    /// File extension used for per-day files in partitioned layouts.
    fn extension(self) -> &'static str {
        match self {
            CopyFormat::Json => ".json",
            CopyFormat::Parquet | CopyFormat::Csv => "",
        }
    }
}

/// Resolve the fully qualified object path for a staging load.
///
/// The key template is a strftime template rendered with the logical
/// timestamp, so date-based folder segments (`log-data/%Y/%m`) work without
/// further plumbing. A `Partitioned` layout only takes effect when the run
/// is a backfill: `logical <= now - threshold`.
pub fn resolve_source_path(
    bucket: &str,
    key_template: &str,
    layout: PathLayout,
    format: CopyFormat,
    logical: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> String {
    let key = logical.format(key_template).to_string();

    match layout {
        PathLayout::Partitioned if logical <= now - threshold => {
            let year = logical.format("%Y");
            let month = logical.format("%m");
            let day = logical.format("%d");
            format!(
                "s3://{bucket}/{key}/{year}/{month}/{year}-{month}-{day}-events{ext}",
                ext = format.extension()
            )
        }
        _ => format!("s3://{bucket}/{key}"),
    }
}
