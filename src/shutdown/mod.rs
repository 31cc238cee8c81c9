//! Run termination
//!
//! Several independent triggers can end a run: an OS signal, the configured
//! test duration elapsing, or a collaborator failing. The coordinator turns
//! all of them into a single transition out of `Running`, fires one
//! cancellation token observed by the scheduler and by in-flight probes, and
//! lets exactly one caller produce the final report.

pub mod signals;

pub use signals::spawn_signal_listener;

use crate::types::{RunState, TerminationSignal};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

const RUNNING: u8 = 0;
const TERMINATING: u8 = 1;
const TERMINATED: u8 = 2;

/// One-shot shutdown latch shared by every termination source
#[derive(Debug)]
pub struct TerminationCoordinator {
    state: AtomicU8,
    cause: OnceLock<TerminationSignal>,
    finalize_claimed: AtomicBool,
    token: CancellationToken,
}

impl Default for TerminationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminationCoordinator {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            cause: OnceLock::new(),
            finalize_claimed: AtomicBool::new(false),
            token: CancellationToken::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => RunState::Running,
            TERMINATING => RunState::Terminating,
            _ => RunState::Terminated,
        }
    }

    /// The trigger that ended the run, once there is one
    pub fn cause(&self) -> Option<TerminationSignal> {
        self.cause.get().copied()
    }

    /// Token cancelled on entry to `Terminating`
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request termination.
    ///
    /// Returns `true` only for the call that moved the run out of `Running`;
    /// every later call is a no-op returning `false`.
    pub fn trigger(&self, signal: TerminationSignal) -> bool {
        match self.state.compare_exchange(RUNNING, TERMINATING, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {
                // Set before cancelling so waiters always observe a cause.
                let _ = self.cause.set(signal);
                self.token.cancel();
                true
            }
            Err(_) => false,
        }
    }

    /// Wait until some trigger has fired and return its cause
    pub async fn terminated(&self) -> TerminationSignal {
        self.token.cancelled().await;
        self.cause().unwrap_or(TerminationSignal::ExternalCancel)
    }

    /// Run `report` exactly once across all callers, after termination was
    /// triggered, then move to `Terminated`.
    ///
    /// Returns `None` while still running or when another caller already
    /// claimed finalization.
    pub fn finalize<T>(&self, report: impl FnOnce(TerminationSignal) -> T) -> Option<T> {
        let cause = self.cause()?;
        if self.finalize_claimed.swap(true, Ordering::AcqRel) {
            return None;
        }

        let output = report(cause);
        self.state.store(TERMINATED, Ordering::Release);
        Some(output)
    }
}
