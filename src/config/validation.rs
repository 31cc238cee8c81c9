//! Non-fatal configuration checks

use crate::{error::Result, models::Config};
use colored::*;
use std::collections::HashSet;
use std::net::IpAddr;

/// Above this rate the resolver, not the tool, is usually what gets measured
const HIGH_RPS: i64 = 10_000;

/// In-flight bounds below this skip ticks as soon as lookups slow down
const SMALL_IN_FLIGHT: usize = 4;

/// Runs `Config::validate` and then collects advisory warnings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate hard constraints, then return every warning that applies
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_pacing(config));
        warnings.extend(Self::validate_names(&config.names));
        warnings.extend(Self::validate_dns_servers(config)?);
        Ok(warnings)
    }

    fn validate_pacing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let interval = config.tick_interval();

        if config.timeout() > interval {
            // Expected concurrency when every lookup runs into the timeout
            let worst_case = (config.timeout().as_secs_f64() / interval.as_secs_f64()).ceil() as usize;
            if worst_case > config.max_in_flight {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Timeout of {}ms spans {} ticks but at most {} lookups may be in flight; slow lookups will cause skipped ticks",
                        config.timeout_ms, worst_case, config.max_in_flight
                    ),
                ));
            } else {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Timeout of {}ms is longer than the {:?} tick interval; lookups will overlap",
                        config.timeout_ms, interval
                    ),
                ));
            }
        }

        if config.rps > HIGH_RPS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} requests per second may saturate the local resolver", config.rps),
            ));
        }

        if config.max_in_flight < SMALL_IN_FLIGHT {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("An in-flight bound of {} will skip ticks under any latency", config.max_in_flight),
            ));
        }

        if config.test_duration().is_none() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "No test duration set; the run ends on interrupt".to_string(),
            ));
        }

        warnings
    }

    fn validate_names(names: &[String]) -> Vec<ValidationWarning> {
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();

        for name in names {
            if !seen.insert(name.to_ascii_lowercase()) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Hostname '{}' is listed more than once and will be probed more often", name),
                ));
            }
            if name.parse::<IpAddr>().is_ok() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("'{}' is an IP literal and resolves without a query", name),
                ));
            }
        }

        warnings
    }

    fn validate_dns_servers(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        if let crate::types::DnsConfig::Custom { servers } = config.dns_config()? {
            for server in servers {
                if server.is_loopback() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("DNS server {} is a loopback address", server),
                    ));
                }
            }
        }

        Ok(warnings)
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let label = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", label.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", label, self.message)
        }
    }
}

/// Convenience wrapper around [`ConfigValidator::validate_comprehensive`]
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
