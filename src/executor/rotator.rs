//! Round-robin target selection

use crate::error::{AppError, Result};
use crate::models::ProbeTarget;

/// Cycles through the configured hostnames in order, wrapping at the end.
///
/// Owned by the dispatch loop alone, so no synchronization is needed.
#[derive(Debug, Clone)]
pub struct TargetRotator {
    targets: Vec<ProbeTarget>,
    position: usize,
}

impl TargetRotator {
    /// Create a rotator starting at the first target
    pub fn new(targets: Vec<ProbeTarget>) -> Result<Self> {
        if targets.is_empty() {
            return Err(AppError::config("At least one hostname is required"));
        }
        Ok(Self { targets, position: 0 })
    }

    /// Build a rotator from plain hostnames
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        Self::new(names.iter().map(|name| ProbeTarget::new(name.as_ref())).collect())
    }

    /// Return the current target and advance
    pub fn next(&mut self) -> ProbeTarget {
        let target = self.targets[self.position].clone();
        self.position = (self.position + 1) % self.targets.len();
        target
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
