//! Data models for the DNS load generator

pub mod config;
pub mod outcome;

// Re-export main model types
pub use config::Config;
pub use outcome::{ProbeOutcome, ProbeTarget};
