//! Configuration assembly from defaults, .env, environment and CLI

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::{config::split_list, Config},
    utils::format_duration_ms,
};

/// Configuration parser that layers CLI arguments over environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build and validate the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_without_env_file()
    }

    /// Same as [`parse`](Self::parse) but ignores any .env file
    pub fn parse_without_env_file(&self) -> Result<Config> {
        let mut config = Config::default();
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply every flag that was given on the command line
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(rps) = cli.rps {
            config.rps = rps;
        }
        if let Some(names) = &cli.names {
            config.names = split_list(names);
        }
        if let Some(enable_logging) = cli.enable_logging {
            config.enable_logging = enable_logging;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_ms = timeout.max(0) as u64;
        }
        if let Some(duration) = cli.duration {
            config.duration_ms = duration;
        }
        if let Some(metric_addr) = &cli.metric_addr {
            config.metric_addr = metric_addr.trim().to_string();
        }
        if let Some(max_in_flight) = cli.max_in_flight {
            config.max_in_flight = max_in_flight;
        }
        if let Some(dns_servers) = &cli.dns_servers {
            config.dns_servers = split_list(dns_servers);
        }
        if let Some(log_format) = cli.log_format {
            config.log_format = log_format;
        }
        if let Some(enable_color) = cli.color_override() {
            config.enable_color = enable_color;
        }
        config.debug = cli.debug;
    }
}

/// Load the complete configuration for `cli`
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Multi-line configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let dns_servers = if config.dns_servers.is_empty() {
        "system".to_string()
    } else {
        config.dns_servers.join(", ")
    };

    [
        format!("Names: {}", config.names.join(", ")),
        format!("RPS: {}", config.rps),
        format!("Timeout: {}", format_duration_ms(config.timeout_ms as i64)),
        format!("Duration: {}", format_duration_ms(config.duration_ms)),
        format!("Max In Flight: {}", config.max_in_flight),
        format!("Metric Address: {}", config.metric_addr),
        format!("DNS Servers: {}", dns_servers),
        format!("Logging: {}", config.enable_logging),
        format!("Color Output: {}", config.enable_color),
        format!("Debug: {}", config.debug),
    ]
    .join("\n")
}
