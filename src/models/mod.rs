//! Data models and structures for the edge scanner

pub mod config;
pub mod results;

// Re-export main model types
pub use config::Config;
pub use results::{ProbeResult, ResultSet, SpeedTestResult};
