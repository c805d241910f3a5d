//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): forwarded requests by method, status, worker
//! - `balancer_request_duration_seconds` (histogram): forwarding latency
//! - `balancer_worker_health` (gauge): 1=healthy, 0=unhealthy, per worker
//! - `balancer_workers` (gauge): pool size by state
//! - `balancer_scale_events_total` (counter): autoscaler outcomes
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests never need to call [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a forwarded request.
pub fn record_request(method: &str, status: u16, worker: &str, start: Instant) {
    counter!(
        "balancer_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "worker" => worker.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one probe.
pub fn record_worker_health(worker: &str, healthy: bool) {
    gauge!("balancer_worker_health", "worker" => worker.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

/// Record the pool size split by health.
pub fn record_pool_size(healthy: usize, unhealthy: usize) {
    gauge!("balancer_workers", "state" => "healthy").set(healthy as f64);
    gauge!("balancer_workers", "state" => "unhealthy").set(unhealthy as f64);
}

/// Record an autoscaler cycle outcome.
pub fn record_scale_event(outcome: &'static str) {
    counter!("balancer_scale_events_total", "outcome" => outcome).increment(1);
}
