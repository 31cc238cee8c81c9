//! Type definitions and aliases

use std::fmt;
use std::net::IpAddr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Resolver variants supported by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DnsConfig {
    /// Use the operating system's resolver configuration
    System,
    /// Query the given name servers directly
    Custom { servers: Vec<IpAddr> },
}

impl DnsConfig {
    /// Get a human-readable name for this resolver configuration
    pub fn name(&self) -> String {
        match self {
            DnsConfig::System => "system".to_string(),
            DnsConfig::Custom { servers } => {
                if servers.len() == 1 {
                    format!("custom ({})", servers[0])
                } else {
                    format!("custom ({} servers)", servers.len())
                }
            }
        }
    }
}

/// Cause of a run's termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationSignal {
    /// SIGINT or SIGTERM delivered to the process
    OsInterrupt,
    /// The configured test duration elapsed
    DurationExpired,
    /// A collaborator (e.g. the metrics listener) failed irrecoverably
    ExternalCancel,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TerminationSignal::OsInterrupt => "interrupt",
            TerminationSignal::DurationExpired => "duration expired",
            TerminationSignal::ExternalCancel => "external cancellation",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a run as seen by the termination coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Terminating,
    Terminated,
}
