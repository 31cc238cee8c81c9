//! Configuration data model and validation

use crate::logging::LogFormat;
use crate::types::{AppError, DnsConfig, Result};
use crate::utils::parse_duration_ms;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Highest accepted dispatch rate; above this the tick period rounds to nothing.
pub const MAX_RPS: i64 = 1_000_000;

/// Highest accepted in-flight bound, well under tokio's semaphore permit limit.
pub const MAX_IN_FLIGHT: usize = 1_000_000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Lookups per second
    #[serde(default = "default_rps")]
    pub rps: i64,

    /// Hostnames to resolve, in rotation order
    #[serde(default = "default_names")]
    pub names: Vec<String>,

    /// Log every lookup instead of drawing a progress line
    #[serde(default = "default_enable_logging")]
    pub enable_logging: bool,

    /// Per-lookup timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Total test duration in milliseconds; non-positive runs until interrupted
    #[serde(default = "default_duration_ms")]
    pub duration_ms: i64,

    /// Listen address for the metrics endpoint
    #[serde(default = "default_metric_addr")]
    pub metric_addr: String,

    /// Upper bound on concurrently running lookups
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Name servers to query instead of the system resolver
    #[serde(default)]
    pub dns_servers: Vec<String>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rps: default_rps(),
            names: default_names(),
            enable_logging: default_enable_logging(),
            timeout_ms: default_timeout_ms(),
            duration_ms: default_duration_ms(),
            metric_addr: default_metric_addr(),
            max_in_flight: default_max_in_flight(),
            dns_servers: Vec::new(),
            enable_color: default_enable_color(),
            log_format: LogFormat::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the per-lookup timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the total test duration, `None` when the run is unbounded
    pub fn test_duration(&self) -> Option<Duration> {
        if self.duration_ms > 0 {
            Some(Duration::from_millis(self.duration_ms as u64))
        } else {
            None
        }
    }

    /// Period between two dispatches, `1s / rps`.
    ///
    /// Only meaningful on a validated configuration.
    pub fn tick_interval(&self) -> Duration {
        let rps = self.rps.clamp(1, MAX_RPS) as u32;
        Duration::from_secs(1) / rps
    }

    /// Normalized `host:port` the metrics listener binds to.
    ///
    /// A bare `:port` binds every interface. Only the syntax is checked here;
    /// hostnames are resolved when the listener binds.
    pub fn metric_bind_addr(&self) -> Result<String> {
        let addr = self.metric_addr.trim();
        let invalid = |reason: &str| {
            AppError::config(format!("Invalid metric address '{}': {}", self.metric_addr, reason))
        };

        let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("expected host:port"))?;
        port.parse::<u16>().map_err(|_| invalid("port must be a number between 0 and 65535"))?;

        if host.is_empty() {
            return Ok(format!("0.0.0.0:{}", port));
        }
        if let Some(inner) = host.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(|| invalid("unterminated IPv6 literal"))?;
            inner.parse::<std::net::Ipv6Addr>().map_err(|_| invalid("invalid IPv6 literal"))?;
        } else if host.contains(':') {
            return Err(invalid("IPv6 hosts must be written as [addr]:port"));
        } else if host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(invalid("invalid host"));
        }

        Ok(addr.to_string())
    }

    /// Build the resolver configuration for the probe
    pub fn dns_config(&self) -> Result<DnsConfig> {
        if self.dns_servers.is_empty() {
            return Ok(DnsConfig::System);
        }

        let servers = self
            .dns_servers
            .iter()
            .map(|server| {
                IpAddr::from_str(server).map_err(|e| {
                    AppError::config(format!("Invalid DNS server IP address '{}': {}", server, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DnsConfig::Custom { servers })
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.rps <= 0 {
            return Err(AppError::config(format!(
                "Requests per second must be greater than 0 (got {})",
                self.rps
            )));
        }

        if self.rps > MAX_RPS {
            return Err(AppError::config(format!(
                "Requests per second cannot exceed {}",
                MAX_RPS
            )));
        }

        if self.names.is_empty() {
            return Err(AppError::config("At least one hostname is required"));
        }

        for name in &self.names {
            if name.trim().is_empty() {
                return Err(AppError::config("Hostname cannot be empty"));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(AppError::config(format!("Hostname '{}' contains whitespace", name)));
            }
        }

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.max_in_flight == 0 {
            return Err(AppError::config("Maximum in-flight lookups must be greater than 0"));
        }

        if self.max_in_flight > MAX_IN_FLIGHT {
            return Err(AppError::config(format!(
                "Maximum in-flight lookups cannot exceed {} (got {})",
                MAX_IN_FLIGHT, self.max_in_flight
            )));
        }

        self.metric_bind_addr()?;
        self.dns_config()?;

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(rps) = std::env::var("DNSPERF_RPS") {
            self.rps = rps.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_RPS value '{}': {}", rps, e)))?;
        }

        if let Ok(names) = std::env::var("DNSPERF_NAMES") {
            self.names = split_list(&names);
        }

        if let Ok(enable_logging) = std::env::var("DNSPERF_ENABLE_LOGGING") {
            self.enable_logging = enable_logging.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_ENABLE_LOGGING value '{}': {}", enable_logging, e)))?;
        }

        if let Ok(timeout) = std::env::var("DNSPERF_TIMEOUT") {
            let ms = parse_duration_ms(&timeout)
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_TIMEOUT value '{}': {}", timeout, e)))?;
            if ms <= 0 {
                return Err(AppError::config("DNSPERF_TIMEOUT must be greater than 0"));
            }
            self.timeout_ms = ms as u64;
        }

        if let Ok(duration) = std::env::var("DNSPERF_DURATION") {
            self.duration_ms = parse_duration_ms(&duration)
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_DURATION value '{}': {}", duration, e)))?;
        }

        if let Ok(metric_addr) = std::env::var("DNSPERF_METRIC_ADDR") {
            self.metric_addr = metric_addr.trim().to_string();
        }

        if let Ok(max_in_flight) = std::env::var("DNSPERF_MAX_IN_FLIGHT") {
            self.max_in_flight = max_in_flight.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_MAX_IN_FLIGHT value '{}': {}", max_in_flight, e)))?;
        }

        if let Ok(dns_servers) = std::env::var("DNSPERF_DNS_SERVERS") {
            self.dns_servers = split_list(&dns_servers);
        }

        if let Ok(enable_color) = std::env::var("DNSPERF_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DNSPERF_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a comma separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Default value functions for serde
fn default_rps() -> i64 {
    crate::defaults::DEFAULT_RPS
}

fn default_names() -> Vec<String> {
    crate::defaults::DEFAULT_NAMES
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_enable_logging() -> bool {
    crate::defaults::DEFAULT_ENABLE_LOGGING
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_duration_ms() -> i64 {
    crate::defaults::DEFAULT_DURATION_MS
}

fn default_metric_addr() -> String {
    crate::defaults::DEFAULT_METRIC_ADDR.to_string()
}

fn default_max_in_flight() -> usize {
    crate::defaults::default_max_in_flight()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
