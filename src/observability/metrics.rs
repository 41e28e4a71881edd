//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ixgen_http_requests_total` (counter): requests by route, status
//! - `ixgen_http_request_duration_seconds` (histogram): latency by route
//! - `ixgen_snapshot_loads_total` (counter): disk reads by resource
//! - `ixgen_snapshot_bytes` (gauge): size of the loaded snapshot by resource
//! - `ixgen_merge_peers_total` (counter): resolved peers by outcome
//! - `ixgen_render_total` (counter): render calls by selector

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::registry::ResourceKind;
use crate::render::StyleSelector;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    let route = route.to_string();
    metrics::counter!(
        "ixgen_http_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("ixgen_http_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_snapshot_load(kind: ResourceKind, bytes: usize) {
    metrics::counter!("ixgen_snapshot_loads_total", "resource" => kind.to_string()).increment(1);
    metrics::gauge!("ixgen_snapshot_bytes", "resource" => kind.to_string()).set(bytes as f64);
}

pub fn record_merge_peer(outcome: &'static str) {
    metrics::counter!("ixgen_merge_peers_total", "outcome" => outcome).increment(1);
}

pub fn record_render(selector: &StyleSelector) {
    metrics::counter!("ixgen_render_total", "selector" => selector.to_string()).increment(1);
}
