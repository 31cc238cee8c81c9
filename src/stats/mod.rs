//! Latency aggregation
//!
//! Probe outcomes are grouped into power-of-two latency tiers starting at
//! 100µs. Every tier is keyed by its lower bound; the first tier (key zero)
//! holds everything at or below 100µs. Success and failure outcomes are kept
//! in independent maps together with running totals, all behind one lock so
//! that each total always equals the sum of its buckets.

use crate::models::ProbeOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Upper bound of the first latency tier
pub const FIRST_BUCKET_BOUND: Duration = Duration::from_micros(100);

/// Map a duration to the lower bound of its latency tier.
///
/// Comparison is strict: a duration equal to a tier boundary stays in the
/// tier below it.
pub fn bucket_for(duration: Duration) -> Duration {
    let mut bucket = Duration::ZERO;
    let mut next_bucket = FIRST_BUCKET_BOUND;

    while duration > next_bucket {
        bucket = next_bucket;
        next_bucket = match next_bucket.checked_mul(2) {
            Some(doubled) => doubled,
            None => break,
        };
    }

    bucket
}

#[derive(Debug, Default)]
struct HistogramState {
    success: BTreeMap<Duration, u64>,
    failure: BTreeMap<Duration, u64>,
    success_count: u64,
    failure_count: u64,
}

/// Running totals observed right after a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub success_count: u64,
    pub failure_count: u64,
}

impl Totals {
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

/// Thread-safe latency histogram shared by every probe of a run
#[derive(Debug, Default)]
pub struct LatencyAggregator {
    state: Mutex<HistogramState>,
}

impl LatencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HistogramState> {
        // Each update is a single increment pair, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one outcome and return the totals including it.
    pub fn record(&self, outcome: &ProbeOutcome) -> Totals {
        self.record_duration(outcome.success, outcome.duration)
    }

    /// Record a raw success/failure observation.
    pub fn record_duration(&self, success: bool, duration: Duration) -> Totals {
        let bucket = bucket_for(duration);

        let mut state = self.lock();
        if success {
            *state.success.entry(bucket).or_insert(0) += 1;
            state.success_count += 1;
        } else {
            *state.failure.entry(bucket).or_insert(0) += 1;
            state.failure_count += 1;
        }

        Totals {
            success_count: state.success_count,
            failure_count: state.failure_count,
        }
    }

    /// Current running totals
    pub fn totals(&self) -> Totals {
        let state = self.lock();
        Totals {
            success_count: state.success_count,
            failure_count: state.failure_count,
        }
    }

    /// Consistent copy of both histograms, buckets in ascending order
    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = self.lock();
        HistogramSnapshot {
            success: state.success.iter().map(|(&bucket, &count)| (bucket, count)).collect(),
            failure: state.failure.iter().map(|(&bucket, &count)| (bucket, count)).collect(),
            success_count: state.success_count,
            failure_count: state.failure_count,
        }
    }

    /// Plain-text report of the current state
    pub fn report(&self) -> String {
        self.snapshot().to_string()
    }
}

/// Point-in-time copy of the histogram
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    /// Ascending (bucket lower bound, count) pairs for successful lookups
    pub success: Vec<(Duration, u64)>,
    /// Ascending (bucket lower bound, count) pairs for failed lookups
    pub failure: Vec<(Duration, u64)>,
    pub success_count: u64,
    pub failure_count: u64,
}

impl HistogramSnapshot {
    pub fn totals(&self) -> Totals {
        Totals {
            success_count: self.success_count,
            failure_count: self.failure_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success_count == 0 && self.failure_count == 0
    }
}

/// Write one report section: `Title: none.` or a title line followed by
/// one `bucket, count` line per bucket.
pub(crate) fn write_section(
    f: &mut impl fmt::Write,
    title: &str,
    buckets: &[(Duration, u64)],
) -> fmt::Result {
    if buckets.is_empty() {
        return writeln!(f, "{}: none.", title);
    }

    writeln!(f, "{}:", title)?;
    for (bucket, count) in buckets {
        if bucket.is_zero() {
            writeln!(f, "0s, {}", count)?;
        } else {
            writeln!(f, "{:?}, {}", bucket, count)?;
        }
    }
    Ok(())
}

impl fmt::Display for HistogramSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_section(f, "Success", &self.success)?;
        write_section(f, "Failure", &self.failure)
    }
}
