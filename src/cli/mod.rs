//! Command-line interface

use crate::logging::LogFormat;
use crate::utils::parse_duration_ms;
use clap::Parser;
use std::path::PathBuf;

/// DNS lookup load generator with a latency histogram and Prometheus metrics
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "dnsperf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lookups per second
    #[arg(long, allow_negative_numbers = true)]
    pub rps: Option<i64>,

    /// Hostnames to resolve, comma-separated
    #[arg(long, value_name = "NAMES")]
    pub names: Option<String>,

    /// Log every lookup instead of showing a progress line
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub enable_logging: Option<bool>,

    /// Per-lookup timeout (e.g. 500ms, 1s)
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<i64>,

    /// Test duration (e.g. 30s, 5m); non-positive runs until interrupted
    #[arg(long, value_parser = parse_duration_arg, allow_hyphen_values = true)]
    pub duration: Option<i64>,

    /// Metrics listen address (e.g. :9090 or 127.0.0.1:9090)
    #[arg(long, value_name = "ADDR")]
    pub metric_addr: Option<String>,

    /// Maximum number of lookups in flight
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<usize>,

    /// Name servers to query instead of the system resolver, comma-separated
    #[arg(long, value_name = "IPS")]
    pub dns_servers: Option<String>,

    /// Log line format (console, json, compact)
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Show supported DNSPERF_* environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write a commented example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_env: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout <= 0 {
                return Err("Timeout must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Color preference from flags and the environment, `None` when unspecified
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color || std::env::var_os("NO_COLOR").is_some() {
            Some(false)
        } else {
            None
        }
    }
}

/// Parse a duration flag into milliseconds
fn parse_duration_arg(s: &str) -> Result<i64, String> {
    parse_duration_ms(s).map_err(|e| e.to_string())
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse::<LogFormat>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_leave_everything_unset() {
        let cli = Cli::parse_from(["dnsperf"]);
        assert!(cli.rps.is_none());
        assert!(cli.names.is_none());
        assert!(cli.enable_logging.is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.duration.is_none());
        assert!(!cli.debug);
        assert!(!cli.env_help);
        assert!(cli.init_env.is_none());
    }

    #[test]
    fn test_env_file_flags() {
        let cli = Cli::parse_from(["dnsperf", "--env-help", "--init-env", "sample.env"]);
        assert!(cli.env_help);
        assert_eq!(cli.init_env, Some(PathBuf::from("sample.env")));
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::parse_from([
            "dnsperf",
            "--rps", "50",
            "--names", "a.com,b.com",
            "--enable-logging", "false",
            "--timeout", "250ms",
            "--duration", "1m30s",
            "--metric-addr", "127.0.0.1:9100",
            "--max-in-flight", "32",
            "--dns-servers", "1.1.1.1",
            "--log-format", "json",
            "--no-color",
            "--debug",
        ]);

        assert_eq!(cli.rps, Some(50));
        assert_eq!(cli.names.as_deref(), Some("a.com,b.com"));
        assert_eq!(cli.enable_logging, Some(false));
        assert_eq!(cli.timeout, Some(250));
        assert_eq!(cli.duration, Some(90_000));
        assert_eq!(cli.metric_addr.as_deref(), Some("127.0.0.1:9100"));
        assert_eq!(cli.max_in_flight, Some(32));
        assert_eq!(cli.dns_servers.as_deref(), Some("1.1.1.1"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.no_color);
        assert!(cli.debug);
    }

    #[test]
    fn test_negative_values_accepted() {
        let cli = Cli::parse_from(["dnsperf", "--rps", "-3", "--duration", "-1"]);
        assert_eq!(cli.rps, Some(-3));
        assert_eq!(cli.duration, Some(-1000));
    }

    #[test]
    fn test_bare_enable_logging_flag() {
        let cli = Cli::parse_from(["dnsperf", "--enable-logging"]);
        assert_eq!(cli.enable_logging, Some(true));
    }

    #[test]
    fn test_invalid_duration_rejected() {
        assert!(Cli::try_parse_from(["dnsperf", "--timeout", "soon"]).is_err());
        assert!(Cli::try_parse_from(["dnsperf", "--duration", "5x"]).is_err());
    }

    #[test]
    fn test_validate_conflicts() {
        let cli = Cli::parse_from(["dnsperf", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["dnsperf", "--timeout", "0"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["dnsperf", "--color"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.color_override(), Some(true));
    }
}
