//! Error types for the snowmelt ETL pipeline.

use snafu::prelude::*;

// ============ Warehouse Errors ============

/// Errors that can occur while talking to the warehouse.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum WarehouseError {
    /// Failed to build the connection pool.
    #[snafu(display("Failed to connect to warehouse: {source}"))]
    Connect { source: sqlx::Error },

    /// A SQL statement failed to execute.
    #[snafu(display("Statement execution failed: {source}"))]
    Statement { source: sqlx::Error },

    /// A result column could not be decoded as an integer.
    #[snafu(display("Failed to decode result column {column}: {source}"))]
    Decode { column: usize, source: sqlx::Error },

    /// Generic failure, produced by mock warehouses in tests.
    #[snafu(display("{message}"))]
    Failure { message: String },
}

// ============ Config Errors ============

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[snafu(display("Failed to read configuration file {path}: {source}"))]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration: {source}"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// No staging tables configured.
    #[snafu(display("At least one staging table must be configured"))]
    NoStages,

    /// A staging table has an empty bucket.
    #[snafu(display("Staging table '{table}' has an empty bucket"))]
    EmptyBucket { table: String },

    /// A staging table has no key columns.
    #[snafu(display("Staging table '{table}' has no key columns"))]
    NoKeyColumns { table: String },

    /// No tables listed for quality checks.
    #[snafu(display("At least one quality-check table must be configured"))]
    NoQualityTables,

    /// A load references a statement missing from the catalog.
    #[snafu(display("Statement '{name}' is not present in the catalog"))]
    MissingStatement { name: String },
}

// ============ Load Errors ============

/// Errors that can occur during staging, fact, or dimension loads.
///
/// Every variant is fatal to its task; retry policy belongs to whatever
/// invokes the pipeline.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LoadError {
    /// Failed to clear a table before loading.
    #[snafu(display("Failed to clear table {table}: {source}"))]
    Truncate {
        table: String,
        source: WarehouseError,
    },

    /// The bulk COPY into a staging table failed.
    #[snafu(display("Failed to copy into {table} from {path}: {source}"))]
    Copy {
        table: String,
        path: String,
        source: WarehouseError,
    },

    /// Post-load cleanup of null key columns failed.
    #[snafu(display("Failed to remove rows with null {column} from {table}: {source}"))]
    NullCleanup {
        table: String,
        column: String,
        source: WarehouseError,
    },

    /// A load referenced a statement name the catalog does not know.
    #[snafu(display("Unknown statement '{name}'"))]
    UnknownStatement { name: String },

    /// The INSERT..SELECT for a fact or dimension table failed.
    #[snafu(display("Failed to load {table} via '{statement}': {source}"))]
    Insert {
        table: String,
        statement: String,
        source: WarehouseError,
    },
}

// ============ Quality Errors ============

/// Errors raised by the data-quality checker.
///
/// The check aborts at the first offending table; the error carries the
/// table name and a human-readable reason.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QualityError {
    /// The count query returned no rows or a row with no columns.
    #[snafu(display("Data quality check failed on {table}: no result returned"))]
    NoResult { table: String },

    /// The table exists but holds zero rows.
    #[snafu(display("Data quality check failed on {table}: zero rows present"))]
    ZeroRows { table: String },

    /// The count query itself failed.
    #[snafu(display("Data quality count query failed on {table}: {source}"))]
    Query {
        table: String,
        source: WarehouseError,
    },
}

impl QualityError {
    /// The name of the table that failed its check.
    pub fn table(&self) -> &str {
        match self {
            QualityError::NoResult { table }
            | QualityError::ZeroRows { table }
            | QualityError::Query { table, .. } => table,
        }
    }

    /// Human-readable reason for the failure.
    pub fn reason(&self) -> &'static str {
        match self {
            QualityError::NoResult { .. } => "no result returned",
            QualityError::ZeroRows { .. } => "zero rows present",
            QualityError::Query { .. } => "count query failed",
        }
    }
}

// ============ Metrics Errors ============

/// Errors that can occur during metrics initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to parse the metrics listen address.
    #[snafu(display("Failed to parse metrics address: {source}"))]
    AddressParse { source: std::net::AddrParseError },

    /// Failed to install the Prometheus recorder.
    #[snafu(display("Failed to install Prometheus recorder: {source}"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },
}

// ============ Top-level Pipeline Errors ============

/// Top-level pipeline errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// Configuration error.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// Warehouse connection error.
    #[snafu(display("Warehouse error: {source}"))]
    Warehouse { source: WarehouseError },

    /// A staging, fact, or dimension load failed.
    #[snafu(display("Load error: {source}"))]
    Load { source: LoadError },

    /// A data-quality check failed.
    #[snafu(display("Quality error: {source}"))]
    Quality { source: QualityError },

    /// Metrics error.
    #[snafu(display("Metrics error: {source}"))]
    Metrics { source: MetricsError },
}

impl From<ConfigError> for PipelineError {
    fn from(source: ConfigError) -> Self {
        PipelineError::Config { source }
    }
}

impl From<WarehouseError> for PipelineError {
    fn from(source: WarehouseError) -> Self {
        PipelineError::Warehouse { source }
    }
}

impl From<LoadError> for PipelineError {
    fn from(source: LoadError) -> Self {
        PipelineError::Load { source }
    }
}

impl From<QualityError> for PipelineError {
    fn from(source: QualityError) -> Self {
        PipelineError::Quality { source }
    }
}

impl From<MetricsError> for PipelineError {
    fn from(source: MetricsError) -> Self {
        PipelineError::Metrics { source }
    }
}
