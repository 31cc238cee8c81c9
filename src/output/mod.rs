//! Console output: the final report, the progress line and the debug banner

pub mod progress;
pub mod report;

pub use progress::ProgressLine;
pub use report::{format_banner, format_dispatch_summary, ReportFormatter};
