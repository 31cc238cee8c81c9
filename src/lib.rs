//! dnsperf
//!
//! A fixed-rate DNS lookup load generator. Hostnames are resolved in
//! round-robin order at a configured rate, every lookup is timed and folded
//! into a power-of-two latency histogram, live counters are exposed to
//! Prometheus, and a single report is printed when the run ends.

pub mod app;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod output;
pub mod shutdown;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use app::{App, RunSummary};
pub use error::{AppError, Result};
pub use executor::{DispatchStats, Dispatcher, ResolutionProbe, TargetRotator};
pub use models::{Config, ProbeOutcome, ProbeTarget};
pub use shutdown::TerminationCoordinator;
pub use stats::{bucket_for, HistogramSnapshot, LatencyAggregator};
pub use types::{RunState, TerminationSignal};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_RPS: i64 = 10;
    pub const DEFAULT_NAMES: &[&str] = &["google.com"];
    pub const DEFAULT_ENABLE_LOGGING: bool = true;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
    /// Non-positive means no time limit
    pub const DEFAULT_DURATION_MS: i64 = -1;
    pub const DEFAULT_METRIC_ADDR: &str = ":9090";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// In-flight lookup bound scaled to the machine
    pub fn default_max_in_flight() -> usize {
        num_cpus::get() * 64
    }
}
