//! Prometheus metrics infrastructure
//!
//! The engine records counters through the `metrics` facade; nothing is
//! exported until [`init_metrics`] installs the Prometheus recorder.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use options_engine::telemetry::{
    CHAIN_CACHE, CHAIN_EXPIRATIONS_SKIPPED, CHAIN_ROWS, IV_SOLVES, STRATEGY_ANALYSES,
};
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP listener on the specified port that exposes metrics
/// at the `/metrics` endpoint. Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9100)?;
/// // Metrics available at http://localhost:9100/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_engine_metrics();

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Register help text for the engine's counters with the installed recorder
pub fn describe_engine_metrics() {
    describe_counter!(IV_SOLVES, "Implied volatility solves by outcome (converged, fallback, expired)");
    describe_counter!(CHAIN_ROWS, "Option chain rows normalized, by option type");
    describe_counter!(
        CHAIN_EXPIRATIONS_SKIPPED,
        "Expirations left out of a chain because they could not be fetched or parsed"
    );
    describe_counter!(CHAIN_CACHE, "Chain cache lookups by result (hit, miss)");
    describe_counter!(STRATEGY_ANALYSES, "Strategy analyses computed");
}
