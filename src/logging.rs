//! Structured logging for dnsperf
//!
//! This module provides:
//! - Leveled logging with console, compact and JSON output formats
//! - A probe logger that emits one line per lookup outcome
//! - A session ID shared by every logger created from the same factory

use crate::error::{AppError, Result};
use crate::models::{Config, ProbeOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Debug level - detailed information for debugging
    Debug = 0,
    /// Info level - general application information
    Info = 1,
    /// Warning level - potentially harmful situations
    Warn = 2,
    /// Error level - error events but application can continue
    Error = 3,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format
    #[default]
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(AppError::parse(format!("Invalid log format: {} (expected console, json or compact)", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Session the entry belongs to
    pub session_id: Option<String>,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
#[derive(Debug, Clone)]
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Session correlation ID
    session_id: Option<String>,
}

impl Logger {
    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.enable_logging {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: config.log_format,
            name,
            session_id: None,
        }
    }

    /// Set session correlation ID
    pub fn set_session_id(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    /// Convenience methods for different log levels
    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Render an entry in the configured format
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    /// Write log entry to output
    fn write_entry(&self, entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let output = self.format_entry(&entry);

        // Write to stderr for errors/warnings, stdout for others
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    /// Format log entry in compact format
    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                session_id: logger.session_id.clone(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finish building without writing
    pub fn build(self) -> LogEntry {
        self.entry
    }

    /// Finalize and write the log entry
    pub fn log(self) {
        self.logger.write_entry(self.entry);
    }
}

/// Per-lookup logger used by probe tasks when logging is enabled
#[derive(Debug, Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    /// Wrap an already configured logger
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Log one outcome as a success or error line
    pub fn log_outcome(&self, outcome: &ProbeOutcome) {
        self.entry_for(outcome).log();
    }

    /// Build the entry `log_outcome` would write
    pub fn entry_for(&self, outcome: &ProbeOutcome) -> LogEntryBuilder<'_> {
        if outcome.success {
            let addresses: Vec<String> = outcome.addresses.iter().map(|ip| ip.to_string()).collect();
            self.logger.info(&format!("{} - [{}]", outcome.target, addresses.join(" ")))
                .field("target", &outcome.target)
                .field("duration_ms", outcome.duration_ms())
        } else {
            let detail = outcome.error.as_deref().unwrap_or("unknown error");
            self.logger.error(&format!("{}: {}", outcome.target, detail))
                .field("target", &outcome.target)
                .field("duration_ms", outcome.duration_ms())
        }
    }
}

/// Creates loggers that share one session ID
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub fn create_logger(&self, name: &str) -> Logger {
        let mut logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone());
        logger
    }

    /// Create the per-lookup logger
    pub fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE"))
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeTarget;
    use std::str::FromStr;
    use std::time::Duration;

    fn plain_logger(format: LogFormat) -> Logger {
        let config = Config {
            enable_color: false,
            log_format: format,
            ..Config::default()
        };
        Logger::with_config("TEST".to_string(), &config)
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::default(), LogFormat::Console);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_logger_levels_follow_config() {
        let mut config = Config::default();
        config.enable_logging = true;
        let logger = Logger::with_config("T".to_string(), &config);
        assert!(logger.would_log(LogLevel::Info));
        assert!(!logger.would_log(LogLevel::Debug));

        config.enable_logging = false;
        let quiet = Logger::with_config("T".to_string(), &config);
        assert!(!quiet.would_log(LogLevel::Info));
        assert!(quiet.would_log(LogLevel::Error));

        config.debug = true;
        let debug = Logger::with_config("T".to_string(), &config);
        assert!(debug.would_log(LogLevel::Debug));
    }

    #[test]
    fn test_console_format() {
        let logger = plain_logger(LogFormat::Console);
        let entry = logger.info("hello").field("key", "value").build();
        let output = logger.format_entry(&entry);
        assert!(output.contains(" INFO [TEST] hello"));
        assert!(output.contains("{key=\"value\"}"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_json_format() {
        let logger = plain_logger(LogFormat::Json);
        let entry = logger.warn("careful").field("n", 3).build();
        let output = logger.format_entry(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["level"], "Warn");
        assert_eq!(parsed["message"], "careful");
        assert_eq!(parsed["fields"]["n"], 3);
    }

    #[test]
    fn test_compact_format() {
        let logger = plain_logger(LogFormat::Compact);
        let entry = logger.error("broken").build();
        let output = logger.format_entry(&entry);
        assert!(output.ends_with(" E TEST: broken"));
    }

    #[test]
    fn test_probe_logger_lines() {
        let probe_logger = ProbeLogger::from_logger(plain_logger(LogFormat::Console));
        let target = ProbeTarget::new("a.com");

        let ok = ProbeOutcome::success(
            &target,
            Duration::from_millis(2),
            vec!["10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap()],
        );
        let entry = probe_logger.entry_for(&ok).build();
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "a.com - [10.0.0.1 10.0.0.2]");

        let failed = ProbeOutcome::failure(&target, Duration::from_secs(1), "lookup timed out after 1s");
        let entry = probe_logger.entry_for(&failed).build();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, "a.com: lookup timed out after 1s");
        assert_eq!(entry.fields["target"], "a.com");
    }

    #[test]
    fn test_factory_shares_session_id() {
        let factory = LoggerFactory::new(Config::default());
        let first = factory.create_logger("A").info("x").build();
        let second = factory.create_logger("B").info("y").build();
        assert_eq!(first.session_id.as_deref(), Some(factory.session_id()));
        assert_eq!(first.session_id, second.session_id);
    }

    #[test]
    fn test_log_entry_serialization() {
        let logger = plain_logger(LogFormat::Json);
        let entry = logger.info("Test").build();

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: LogEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.level, LogLevel::Info);
        assert_eq!(deserialized.message, "Test");
        assert_eq!(deserialized.logger, "TEST");
    }
}
