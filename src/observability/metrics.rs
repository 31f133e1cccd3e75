//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint_probe_total` (counter): probes by url, outcome
//! - `endpoint_probe_duration_seconds` (histogram): probe latency by url
//! - `endpoint_healthy` (gauge): 1=healthy, 0=unhealthy, per url
//! - `endpoint_selection_cycles_total` (counter): cycles by result
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when the exporter is disabled.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::health::ProbeResult;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(result: &ProbeResult) {
    let url = result.endpoint.base_url();
    let outcome = result.error_kind.map_or("healthy", |k| k.as_str());

    ::metrics::counter!("endpoint_probe_total", "url" => url.clone(), "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("endpoint_probe_duration_seconds", "url" => url.clone())
        .record(result.latency.as_secs_f64());
    ::metrics::gauge!("endpoint_healthy", "url" => url).set(if result.healthy { 1.0 } else { 0.0 });
}

pub fn record_cycle(result: &'static str) {
    ::metrics::counter!("endpoint_selection_cycles_total", "result" => result).increment(1);
}
