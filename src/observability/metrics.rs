//! Metrics collection and exposition.
//!
//! # Metrics
//! - `user_service_requests_total` (counter): requests by method, status
//! - `user_service_request_duration_seconds` (histogram): latency distribution
//! - `user_service_rate_limited_total` (counter): throttled requests by policy
//! - `user_service_rate_limiter_keys` (gauge): keys tracked per policy
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("user_service_requests_total", &labels).increment(1);
    ::metrics::histogram!("user_service_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(policy: &str) {
    ::metrics::counter!("user_service_rate_limited_total", "policy" => policy.to_string())
        .increment(1);
}

pub fn record_limiter_keys(policy: &str, keys: usize) {
    ::metrics::gauge!("user_service_rate_limiter_keys", "policy" => policy.to_string())
        .set(keys as f64);
}
