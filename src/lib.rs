//! Edge Scanner
//!
//! Discovers which candidate addresses are reachable endpoints of a CDN edge
//! network, measures their TCP handshake latency, optionally benchmarks
//! download throughput, and ranks the survivors.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod source;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{RunOutcome, ScanPipeline, ScanReport};
pub use models::{Config, ProbeResult, ResultSet, SpeedTestResult};
pub use types::{CandidateAddress, Endpoint};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_INPUT_FILE: &str = "ip.txt";
    pub const DEFAULT_OUTPUT_FILE: &str = "ip.csv";
    pub const DEFAULT_PORT: u16 = 443;
    pub const DEFAULT_MAX_CONCURRENCY: usize = 100;
    pub const DEFAULT_SPEED_TEST_WORKERS: usize = 5;
    pub const DEFAULT_TRACE_URL: &str = "speed.cloudflare.com/cdn-cgi/trace";
    pub const DEFAULT_SPEED_TEST_URL: &str = "speed.cloudflare.com/__down?bytes=500000000";
    pub const DEFAULT_ENABLE_TLS: bool = true;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_SPEED_TEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    /// Sent on every request; the trace endpoint echoes it back as `uag=`.
    pub const USER_AGENT: &str = "Mozilla/5.0";
}
