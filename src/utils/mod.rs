//! Small shared helpers

pub mod duration;

pub use duration::{parse_duration_ms, format_duration_ms};
