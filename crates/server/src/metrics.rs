//! Prometheus metrics: request counts, pipeline stage latencies, and
//! degraded-mode activations (SPEC §6/§7 ambient observability).

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global recorder and returns a handle whose `render()` backs
/// the `/metrics` endpoint.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder")
}

pub fn record_request(method: &str, path: &str, status: u16) {
    metrics::counter!(
        "net_est_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

pub fn record_stage_latency(stage: &'static str, duration_ms: u64) {
    metrics::histogram!("net_est_pipeline_stage_duration_ms", "stage" => stage).record(duration_ms as f64);
}

pub fn record_degraded_activation() {
    metrics::counter!("net_est_embedder_degraded_total").increment(1);
}
