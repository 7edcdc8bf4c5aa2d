//! Metrics and observability infrastructure.

pub mod events;

use metrics_exporter_prometheus::PrometheusBuilder;
use snafu::ResultExt;
use std::net::SocketAddr;
use tracing::info;

use crate::error::{AddressParseSnafu, MetricsError, PrometheusInitSnafu};

/// Macro for emitting metric events.
///
/// Calls `InternalEvent::emit()` on the given event, which records the
/// corresponding Prometheus metric.
///
/// # Example
///
/// ```ignore
/// emit!(StagingCopied { table: "staging_events".into() });
/// ```
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::metrics::events::InternalEvent::emit($event)
    };
}

// Re-export the macro at crate root
pub use emit;

/// Install the Prometheus recorder with an HTTP listener on `address`.
///
/// The endpoint lives for the duration of the run; scrapers see counters for
/// staged tables, loaded tables, removed null rows, and quality outcomes.
pub fn init_metrics(address: &str) -> Result<(), MetricsError> {
    let addr: SocketAddr = address.parse().context(AddressParseSnafu)?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context(PrometheusInitSnafu)?;
    info!(%addr, "Metrics endpoint listening");
    Ok(())
}
