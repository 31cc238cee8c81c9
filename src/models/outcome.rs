//! Probe targets and outcomes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// A hostname to resolve. Cheap to clone; shared between the rotator and
/// every probe task dispatched for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeTarget(Arc<str>);

impl ProbeTarget {
    pub fn new(hostname: &str) -> Self {
        Self(Arc::from(hostname))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProbeTarget {
    fn from(hostname: &str) -> Self {
        Self::new(hostname)
    }
}

/// Result of a single timed lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Hostname that was resolved
    pub target: String,
    /// Whether the lookup returned before the deadline without error
    pub success: bool,
    /// Time from dispatch to completion, error, or deadline
    pub duration: Duration,
    /// Failure description when `success` is false
    pub error: Option<String>,
    /// Addresses returned by a successful lookup
    pub addresses: Vec<IpAddr>,
}

impl ProbeOutcome {
    /// Create a successful outcome
    pub fn success(target: &ProbeTarget, duration: Duration, addresses: Vec<IpAddr>) -> Self {
        Self {
            target: target.to_string(),
            success: true,
            duration,
            error: None,
            addresses,
        }
    }

    /// Create a failed outcome
    pub fn failure(target: &ProbeTarget, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            success: false,
            duration,
            error: Some(error.into()),
            addresses: Vec::new(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}
