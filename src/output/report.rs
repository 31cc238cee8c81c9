//! Final report and debug summaries

use crate::executor::DispatchStats;
use crate::models::Config;
use crate::stats::{write_section, HistogramSnapshot};
use crate::types::TerminationSignal;
use crate::utils::format_duration_ms;
use colored::*;
use std::fmt::Write as _;
use std::time::Duration;

/// Renders the end-of-run histogram report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    use_color: bool,
}

impl ReportFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Both sections, success first.
    ///
    /// Without color this is exactly the snapshot's `Display` output.
    pub fn format(&self, snapshot: &HistogramSnapshot) -> String {
        if !self.use_color {
            return snapshot.to_string();
        }

        let mut output = String::new();
        let success_title = "Success".green().bold().to_string();
        let failure_title = "Failure".red().bold().to_string();
        let _ = write_section(&mut output, &success_title, &snapshot.success);
        let _ = write_section(&mut output, &failure_title, &snapshot.failure);
        output
    }
}

/// Startup banner printed in debug mode
pub fn format_banner(config: &Config, resolver: &str) -> String {
    let mut output = String::new();
    let commit = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let target = option_env!("TARGET_TRIPLE").unwrap_or("unknown");
    let built = option_env!("BUILD_TIME").unwrap_or("unknown");

    let _ = writeln!(output, "{} {} ({}, {})", crate::PKG_NAME, crate::VERSION, commit, target);
    let _ = writeln!(output, "  built:         {}", built);
    let _ = writeln!(output, "  rps:           {}", config.rps);
    let _ = writeln!(output, "  names:         {}", config.names.join(", "));
    let _ = writeln!(output, "  timeout:       {}", format_duration_ms(config.timeout_ms as i64));
    let _ = writeln!(output, "  duration:      {}", format_duration_ms(config.duration_ms));
    let _ = writeln!(output, "  max in flight: {}", config.max_in_flight);
    let _ = writeln!(output, "  metrics:       {}", config.metric_addr);
    let _ = write!(output, "  resolver:      {}", resolver);
    output
}

/// Dispatch summary printed in debug mode after the report
pub fn format_dispatch_summary(stats: &DispatchStats, cause: Option<TerminationSignal>, elapsed: Duration) -> String {
    let cause = cause.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
    format!(
        "dispatched={}, skipped={}, trigger={}, elapsed={:?}",
        stats.dispatched, stats.skipped, cause, elapsed
    )
}
