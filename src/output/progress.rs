//! In-place progress line shown while per-lookup logging is off

use crate::stats::Totals;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct LineState {
    /// Something was written since the last newline
    dirty: bool,
    /// `finish` ran; later updates are ignored
    closed: bool,
}

/// `\rsuccess=N, failure=M` rewritten on stderr after every lookup.
///
/// Probe tasks finish out of order, so an update whose total is not newer
/// than the one already shown is dropped and the line never goes backwards.
#[derive(Debug, Clone, Default)]
pub struct ProgressLine {
    shown: Arc<AtomicU64>,
    state: Arc<Mutex<LineState>>,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the line for `totals`
    pub fn render(totals: Totals) -> String {
        format!("\rsuccess={}, failure={}", totals.success_count, totals.failure_count)
    }

    /// Show `totals` unless a newer line was already written or the line
    /// was finished. Returns whether anything was written.
    pub fn update(&self, totals: Totals) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.closed {
            return false;
        }
        if self.shown.fetch_max(totals.total(), Ordering::AcqRel) >= totals.total() {
            return false;
        }
        state.dirty = true;

        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(Self::render(totals).as_bytes());
        let _ = stderr.flush();
        true
    }

    /// End the line so following output starts on a fresh one, and stop
    /// accepting updates
    pub fn finish(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
            if std::mem::take(&mut state.dirty) {
                eprintln!();
            }
        }
    }

    /// Highest total written so far
    pub fn shown_total(&self) -> u64 {
        self.shown.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(success_count: u64, failure_count: u64) -> Totals {
        Totals { success_count, failure_count }
    }

    #[test]
    fn test_render() {
        assert_eq!(ProgressLine::render(totals(3, 1)), "\rsuccess=3, failure=1");
        assert_eq!(ProgressLine::render(Totals::default()), "\rsuccess=0, failure=0");
    }

    #[test]
    fn test_stale_updates_dropped() {
        let progress = ProgressLine::new();
        assert!(progress.update(totals(2, 1)));
        assert!(!progress.update(totals(1, 1)));
        assert_eq!(progress.shown_total(), 3);

        assert!(progress.update(totals(3, 1)));
        assert_eq!(progress.shown_total(), 4);
        progress.finish();
    }

    #[test]
    fn test_clones_share_state() {
        let progress = ProgressLine::new();
        let clone = progress.clone();
        clone.update(totals(5, 0));
        assert_eq!(progress.shown_total(), 5);
    }

    #[test]
    fn test_updates_after_finish_are_ignored() {
        let progress = ProgressLine::new();
        assert!(progress.update(totals(1, 0)));
        progress.finish();

        let late = progress.clone();
        assert!(!late.update(totals(2, 0)));
        assert_eq!(progress.shown_total(), 1);

        // A second finish has nothing left to terminate
        progress.finish();
    }
}
