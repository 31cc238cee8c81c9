//! Fixed-rate dispatch of lookups
//!
//! A single control loop ticks at `1s / rps`, picks the next hostname and
//! spawns one probe task per tick. The number of probes in flight is bounded
//! by a semaphore; a tick that finds it exhausted is skipped rather than
//! queued, so a slow resolver never builds an unbounded backlog.

pub mod probe;
pub mod rotator;

pub use probe::{ConsoleSink, ProbeRecorder, ResolutionProbe};
pub use rotator::TargetRotator;

use crate::shutdown::TerminationCoordinator;
use crate::types::TerminationSignal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Pacing parameters of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Time between two dispatches
    pub interval: Duration,
    /// Maximum number of probes in flight
    pub max_in_flight: usize,
    /// Stop the run after this long; `None` runs until interrupted
    pub test_duration: Option<Duration>,
}

impl DispatchConfig {
    pub fn from_config(config: &crate::models::Config) -> Self {
        Self {
            interval: config.tick_interval(),
            max_in_flight: config.max_in_flight,
            test_duration: config.test_duration(),
        }
    }
}

/// What the dispatch loop did during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Ticks that spawned a probe
    pub dispatched: u64,
    /// Ticks dropped because the in-flight bound was reached
    pub skipped: u64,
}

/// The dispatch loop and everything a probe task needs
pub struct Dispatcher {
    rotator: TargetRotator,
    probe: Arc<ResolutionProbe>,
    recorder: Arc<ProbeRecorder>,
    limiter: Arc<Semaphore>,
    config: DispatchConfig,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(rotator: TargetRotator, probe: ResolutionProbe, recorder: Arc<ProbeRecorder>, config: DispatchConfig) -> Self {
        Self {
            rotator,
            probe: Arc::new(probe),
            recorder,
            limiter: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            config,
            stats: DispatchStats::default(),
        }
    }

    /// Tick until the coordinator leaves `Running`.
    ///
    /// The first tick fires immediately. When the test duration elapses the
    /// loop itself triggers `DurationExpired`; termination always wins over a
    /// tick that becomes ready at the same instant.
    pub async fn run(mut self, coordinator: &TerminationCoordinator) -> DispatchStats {
        let token = coordinator.token();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline = self.config.test_duration.map(|duration| Instant::now() + duration);
        let expiry = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = &mut expiry => {
                    coordinator.trigger(TerminationSignal::DurationExpired);
                    break;
                }
                _ = ticker.tick() => self.dispatch_next(&token),
            }
        }

        self.stats
    }

    fn dispatch_next(&mut self, token: &CancellationToken) {
        let permit = match self.limiter.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.stats.skipped += 1;
                return;
            }
        };

        let target = self.rotator.next();
        self.stats.dispatched += 1;

        let probe = self.probe.clone();
        let recorder = self.recorder.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                outcome = probe.probe(&target) => outcome,
            };
            recorder.record(&outcome);
        });
    }
}
