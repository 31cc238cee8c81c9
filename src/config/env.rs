//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists. Variables already set in the
    /// process environment are left untouched.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Example .env file content
    pub fn create_example_env_content() -> String {
        r#"# dnsperf configuration
#
# Values here are defaults; environment variables and command-line
# arguments take precedence.

# Lookups per second
# DNSPERF_RPS=10

# Hostnames to resolve, comma-separated, in rotation order
# DNSPERF_NAMES=google.com,example.com

# Log every lookup (true) or show a progress line (false)
# DNSPERF_ENABLE_LOGGING=true

# Per-lookup timeout
# DNSPERF_TIMEOUT=1s

# Test duration; -1 runs until interrupted
# DNSPERF_DURATION=-1

# Prometheus listen address
# DNSPERF_METRIC_ADDR=:9090

# Maximum lookups in flight
# DNSPERF_MAX_IN_FLIGHT=256

# Name servers to query instead of the system resolver
# DNSPERF_DNS_SERVERS=8.8.8.8,1.1.1.1

# Enable colored output
# DNSPERF_ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save the example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// All supported variables: name, description, example
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("DNSPERF_RPS", "Lookups per second", "10"),
            ("DNSPERF_NAMES", "Comma-separated hostnames to resolve", "google.com,example.com"),
            ("DNSPERF_ENABLE_LOGGING", "Log every lookup", "true"),
            ("DNSPERF_TIMEOUT", "Per-lookup timeout", "1s"),
            ("DNSPERF_DURATION", "Test duration, -1 for unlimited", "30s"),
            ("DNSPERF_METRIC_ADDR", "Prometheus listen address", ":9090"),
            ("DNSPERF_MAX_IN_FLIGHT", "Maximum lookups in flight", "256"),
            ("DNSPERF_DNS_SERVERS", "Comma-separated name server IPs", "8.8.8.8,1.1.1.1"),
            ("DNSPERF_ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Help text for environment variables
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("dnsperf configuration"));
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("DNSPERF_RPS"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_missing_env_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), false).is_ok());
    }
}
