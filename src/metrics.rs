//! Prometheus-compatible metrics for the trisearch proxy.
//!
//! Tracks aggregated searches, per-provider outbound calls and collaborator
//! invocations using the prometheus crate.

use prometheus::{
    self, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get or initialize the global metrics instance.
pub fn get_metrics() -> Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}

/// Default histogram buckets for latency tracking (in seconds).
/// Upstream search APIs and collaborators are slow, so this reaches 60s.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ]
}

/// All metrics for the trisearch server.
pub struct Metrics {
    /// Prometheus registry for all metrics.
    pub registry: Registry,

    /// Aggregated searches dispatched across all providers.
    pub searches_total: IntCounter,
    /// Searches rejected before any outbound call (empty query, bad mode).
    pub validation_failures_total: IntCounter,
    /// Outbound provider calls, labelled by provider.
    pub provider_requests_total: IntCounterVec,
    /// Failed provider calls, labelled by provider.
    pub provider_errors_total: IntCounterVec,
    /// Collaborator invocations, labelled by collaborator and outcome.
    pub collaborator_invocations_total: IntCounterVec,
    /// Provider call duration in seconds, labelled by provider.
    pub provider_duration_seconds: HistogramVec,
    /// Uptime in seconds.
    pub uptime_seconds: IntGauge,

    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let searches_total = IntCounter::new(
            "trisearch_searches_total",
            "Total number of aggregated searches dispatched",
        )
        .expect("failed to create counter");

        let validation_failures_total = IntCounter::new(
            "trisearch_validation_failures_total",
            "Total number of searches rejected during validation",
        )
        .expect("failed to create counter");

        let provider_requests_total = IntCounterVec::new(
            Opts::new(
                "trisearch_provider_requests_total",
                "Total number of outbound provider calls",
            ),
            &["provider"],
        )
        .expect("failed to create counter");

        let provider_errors_total = IntCounterVec::new(
            Opts::new(
                "trisearch_provider_errors_total",
                "Total number of failed provider calls",
            ),
            &["provider"],
        )
        .expect("failed to create counter");

        let collaborator_invocations_total = IntCounterVec::new(
            Opts::new(
                "trisearch_collaborator_invocations_total",
                "Total number of collaborator invocations",
            ),
            &["collaborator", "outcome"],
        )
        .expect("failed to create counter");

        let provider_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "trisearch_provider_duration_seconds",
                "Provider call duration in seconds",
            )
            .buckets(default_latency_buckets()),
            &["provider"],
        )
        .expect("failed to create histogram");

        let uptime_seconds = IntGauge::new("trisearch_uptime_seconds", "Server uptime in seconds")
            .expect("failed to create gauge");

        registry
            .register(Box::new(searches_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(validation_failures_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(provider_requests_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(provider_errors_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(collaborator_invocations_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(provider_duration_seconds.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(uptime_seconds.clone()))
            .expect("failed to register metric");

        Self {
            registry,
            searches_total,
            validation_failures_total,
            provider_requests_total,
            provider_errors_total,
            collaborator_invocations_total,
            provider_duration_seconds,
            uptime_seconds,
            start_time: Instant::now(),
        }
    }

    /// Record one finished provider call.
    pub fn record_provider_call(&self, provider: &str, elapsed: Duration, ok: bool) {
        self.provider_requests_total
            .with_label_values(&[provider])
            .inc();
        self.provider_duration_seconds
            .with_label_values(&[provider])
            .observe(elapsed.as_secs_f64());
        if !ok {
            self.provider_errors_total.with_label_values(&[provider]).inc();
        }
    }

    /// Record one collaborator invocation.
    pub fn record_collaborator(&self, collaborator: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.collaborator_invocations_total
            .with_label_values(&[collaborator, outcome])
            .inc();
    }

    /// Update the uptime gauge.
    pub fn update_uptime(&self) {
        self.uptime_seconds
            .set(self.start_time.elapsed().as_secs() as i64);
    }

    /// Export metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;
        self.update_uptime();

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
