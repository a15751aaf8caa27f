//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_attempts_total` (counter): attempts by service, outcome
//! - `service_calls_total` (counter): finished calls by service, outcome
//! - `service_call_duration_seconds` (histogram): call latency incl. retries
//! - `service_breaker_open` (gauge): 1=open, 0=closed
//! - `service_breaker_rejections_total` (counter): calls refused by an open breaker
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op (library use, tests)
//! - Labels are service name and outcome kind only

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one attempt.
pub fn record_attempt(service: &str, outcome: &'static str) {
    metrics::counter!("service_attempts_total", "service" => service.to_owned(), "outcome" => outcome)
        .increment(1);
}

/// Count one finished call and its latency.
pub fn record_call(service: &str, outcome: &'static str, started: Instant) {
    metrics::counter!("service_calls_total", "service" => service.to_owned(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!("service_call_duration_seconds", "service" => service.to_owned())
        .record(started.elapsed().as_secs_f64());
}

/// Publish a breaker transition.
pub fn record_breaker_state(service: &str, open: bool) {
    metrics::gauge!("service_breaker_open", "service" => service.to_owned())
        .set(if open { 1.0 } else { 0.0 });
}

/// Count a call refused by an open breaker.
pub fn record_breaker_rejection(service: &str) {
    metrics::counter!("service_breaker_rejections_total", "service" => service.to_owned()).increment(1);
}
