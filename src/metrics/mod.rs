//! Prometheus metrics for lookups
//!
//! Each run owns its own [`prometheus::Registry`] holding:
//! - `dnsperf_lookup_success_total`: successful lookups
//! - `dnsperf_lookup_errors_total`: failed or timed out lookups
//! - `dnsperf_lookup_duration_seconds`: lookup latency as seen by the client
//!
//! The histogram uses fixed buckets unrelated to the power-of-two tiers of
//! the final report.

pub mod server;

pub use server::{metrics_router, MetricsServer};

use crate::error::Result;
use crate::models::ProbeOutcome;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

/// Histogram bucket upper bounds, in seconds
pub const LOOKUP_DURATION_BUCKETS: &[f64] = &[
    0.001, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0,
    4.0, 5.0,
];

const NAMESPACE: &str = "dnsperf";
const SUBSYSTEM: &str = "lookup";

/// Lookup metrics registered in a dedicated registry
#[derive(Clone)]
pub struct LookupMetrics {
    registry: Registry,
    success_total: Counter,
    errors_total: Counter,
    duration_seconds: Histogram,
}

impl LookupMetrics {
    /// Create and register all lookup metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let success_total = Counter::with_opts(
            Opts::new("success_total", "Number of successful lookups.")
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM),
        )?;
        let errors_total = Counter::with_opts(
            Opts::new("errors_total", "Number of lookup errors.")
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM),
        )?;
        let duration_seconds = Histogram::with_opts(
            HistogramOpts::new("duration_seconds", "Duration for DNS lookup measured by the client")
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM)
                .buckets(LOOKUP_DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(success_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            registry,
            success_total,
            errors_total,
            duration_seconds,
        })
    }

    /// Account for one lookup outcome
    pub fn observe(&self, outcome: &ProbeOutcome) {
        self.duration_seconds.observe(outcome.duration.as_secs_f64());
        if outcome.success {
            self.success_total.inc();
        } else {
            self.errors_total.inc();
        }
    }

    pub fn success_total(&self) -> u64 {
        self.success_total.get() as u64
    }

    pub fn errors_total(&self) -> u64 {
        self.errors_total.get() as u64
    }

    /// Encode all metrics to the Prometheus text format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::error::AppError::metrics(format!("Metrics output is not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeTarget;
    use std::time::Duration;

    #[test]
    fn test_observe_updates_counters() {
        let metrics = LookupMetrics::new().unwrap();
        let target = ProbeTarget::new("a.com");

        metrics.observe(&ProbeOutcome::success(&target, Duration::from_millis(5), Vec::new()));
        metrics.observe(&ProbeOutcome::success(&target, Duration::from_millis(15), Vec::new()));
        metrics.observe(&ProbeOutcome::failure(&target, Duration::from_secs(1), "timeout"));

        assert_eq!(metrics.success_total(), 2);
        assert_eq!(metrics.errors_total(), 1);
        assert_eq!(metrics.duration_seconds.get_sample_count(), 3);
    }

    #[test]
    fn test_encode_contains_metric_names() {
        let metrics = LookupMetrics::new().unwrap();
        metrics.observe(&ProbeOutcome::success(&ProbeTarget::new("a.com"), Duration::from_millis(2), Vec::new()));

        let text = metrics.encode().unwrap();
        assert!(text.contains("dnsperf_lookup_success_total 1"));
        assert!(text.contains("dnsperf_lookup_errors_total 0"));
        assert!(text.contains("dnsperf_lookup_duration_seconds_bucket{le=\"0.001\"} 0"));
        assert!(text.contains("dnsperf_lookup_duration_seconds_bucket{le=\"0.01\"} 1"));
        assert!(text.contains("dnsperf_lookup_duration_seconds_count 1"));
    }

    #[test]
    fn test_independent_registries() {
        let first = LookupMetrics::new().unwrap();
        let second = LookupMetrics::new().unwrap();
        first.observe(&ProbeOutcome::failure(&ProbeTarget::new("a.com"), Duration::from_millis(1), "x"));

        assert_eq!(first.errors_total(), 1);
        assert_eq!(second.errors_total(), 0);
    }

    #[test]
    fn test_bucket_layout() {
        assert_eq!(LOOKUP_DURATION_BUCKETS.len(), 18);
        assert!(LOOKUP_DURATION_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }
}
