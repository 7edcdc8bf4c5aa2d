//! Snowmelt CLI: one invocation runs the ETL pipeline once.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use snowmelt::{
    init_metrics, init_tracing, CliArgs, Config, EtlPipeline, PostgresWarehouse, RunContext,
    StatementCatalog,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();

    let config = match Config::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.metrics.enabled {
        if let Err(e) = init_metrics(&config.metrics.address) {
            eprintln!("Failed to initialize metrics: {e}");
            return ExitCode::FAILURE;
        }
    }

    let warehouse = match PostgresWarehouse::connect_lazy(&config.warehouse) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to set up warehouse connection: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline =
        match EtlPipeline::from_config(&config, StatementCatalog::sparkify(), Arc::new(warehouse)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Invalid pipeline configuration: {e}");
                return ExitCode::FAILURE;
            }
        };

    let logical = args.logical_date.unwrap_or_else(Utc::now);
    let run = RunContext::new(logical);
    info!(logical = %run.logical, "Starting snowmelt run");

    match pipeline.run(&run).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Pipeline run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
