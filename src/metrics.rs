//! Prometheus metrics.
//!
//! Recording goes through the `metrics` facade; the exporter handle renders
//! the text format for `GET /metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder once and return its handle.
///
/// Later calls return the same handle. If another recorder is already
/// installed, a detached handle is returned that renders nothing.
pub fn install() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Prometheus recorder not installed: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Count a proxied request by kind (`playlist` / `media`) and status.
pub fn record_request(kind: &'static str, status: u16) {
    metrics::counter!(
        "vidrelay_requests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_duration(kind: &'static str, start: Instant) {
    metrics::histogram!("vidrelay_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error() {
    metrics::counter!("vidrelay_upstream_errors_total").increment(1);
}

pub fn record_rewritten_references(count: usize) {
    metrics::counter!("vidrelay_rewritten_references_total").increment(count as u64);
}
