//! Timed lookups and their side effects

use crate::dns::HostResolver;
use crate::error::AppError;
use crate::logging::ProbeLogger;
use crate::metrics::LookupMetrics;
use crate::models::{ProbeOutcome, ProbeTarget};
use crate::output::ProgressLine;
use crate::stats::{LatencyAggregator, Totals};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One hostname lookup bounded by a deadline
#[derive(Clone)]
pub struct ResolutionProbe {
    resolver: Arc<dyn HostResolver>,
    timeout: Duration,
}

impl ResolutionProbe {
    pub fn new(resolver: Arc<dyn HostResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `target` and time it.
    ///
    /// The deadline counts as a failure whose duration is the time waited,
    /// roughly the timeout itself.
    pub async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
        let start = Instant::now();
        let lookup = self.resolver.lookup_host(target.as_str());

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(addresses)) => ProbeOutcome::success(target, start.elapsed(), addresses),
            Ok(Err(e)) => ProbeOutcome::failure(target, start.elapsed(), e.to_string()),
            Err(_) => {
                let error = AppError::timeout(format!("lookup {} timed out after {:?}", target, self.timeout));
                ProbeOutcome::failure(target, start.elapsed(), error.to_string())
            }
        }
    }
}

/// Where per-lookup console output goes
#[derive(Debug, Clone)]
pub enum ConsoleSink {
    /// One log line per lookup
    Log(ProbeLogger),
    /// A single progress line rewritten in place
    Progress(ProgressLine),
    /// Nothing on the console
    Silent,
}

/// Applies every side effect of a finished probe: histogram, metrics and
/// console output, in that order.
pub struct ProbeRecorder {
    aggregator: Arc<LatencyAggregator>,
    metrics: Option<LookupMetrics>,
    console: ConsoleSink,
}

impl ProbeRecorder {
    pub fn new(aggregator: Arc<LatencyAggregator>, metrics: Option<LookupMetrics>, console: ConsoleSink) -> Self {
        Self {
            aggregator,
            metrics,
            console,
        }
    }

    /// Record one outcome and return the totals including it
    pub fn record(&self, outcome: &ProbeOutcome) -> Totals {
        let totals = self.aggregator.record(outcome);
        if let Some(metrics) = &self.metrics {
            metrics.observe(outcome);
        }

        match &self.console {
            ConsoleSink::Log(logger) => logger.log_outcome(outcome),
            ConsoleSink::Progress(progress) => {
                progress.update(totals);
            }
            ConsoleSink::Silent => {}
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::net::IpAddr;

    struct ScriptedResolver {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl HostResolver for ScriptedResolver {
        async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(AppError::dns_resolution(format!("no such host {}", hostname)))
            } else {
                Ok(vec!["192.0.2.1".parse().unwrap()])
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn probe_with(delay: Duration, fail: bool, timeout: Duration) -> ResolutionProbe {
        ResolutionProbe::new(Arc::new(ScriptedResolver { delay, fail }), timeout)
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_lookup() {
        let probe = probe_with(Duration::from_millis(20), false, Duration::from_secs(1));
        let outcome = probe.probe(&ProbeTarget::new("a.com")).await;

        assert!(outcome.success);
        assert_eq!(outcome.target, "a.com");
        assert_eq!(outcome.duration, Duration::from_millis(20));
        assert_eq!(outcome.addresses.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_error_is_failure() {
        let probe = probe_with(Duration::from_millis(5), true, Duration::from_secs(1));
        let outcome = probe.probe(&ProbeTarget::new("missing.example")).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("missing.example"));
        assert_eq!(outcome.duration, Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_failure_at_deadline() {
        let probe = probe_with(Duration::from_secs(5), false, Duration::from_millis(100));
        let outcome = probe.probe(&ProbeTarget::new("slow.example")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.duration, Duration::from_millis(100));
        assert_eq!(
            outcome.error.as_deref(),
            Some("Timeout error: lookup slow.example timed out after 100ms")
        );
    }

    #[test]
    fn test_recorder_updates_histogram_and_metrics() {
        let aggregator = Arc::new(LatencyAggregator::new());
        let metrics = LookupMetrics::new().unwrap();
        let recorder = ProbeRecorder::new(aggregator.clone(), Some(metrics.clone()), ConsoleSink::Silent);
        let target = ProbeTarget::new("a.com");

        recorder.record(&ProbeOutcome::success(&target, Duration::from_millis(1), Vec::new()));
        let totals = recorder.record(&ProbeOutcome::failure(&target, Duration::from_secs(1), "timeout"));

        assert_eq!(totals, Totals { success_count: 1, failure_count: 1 });
        assert_eq!(aggregator.totals(), totals);
        assert_eq!(metrics.success_total(), 1);
        assert_eq!(metrics.errors_total(), 1);
    }
}
