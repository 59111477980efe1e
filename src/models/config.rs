//! Configuration data model and validation

use crate::types::{AppError, Endpoint, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
///
/// Built once at startup from defaults, `.env`, the process environment and
/// CLI flags, validated, then shared read-only with every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Candidate list path
    #[serde(default = "default_input_file")]
    pub input_file: String,

    /// CSV output path
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Port used when a candidate carries none
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Maximum simultaneously in-flight probes
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Speed-test workers; 0 disables the stage
    #[serde(default = "default_speed_test_workers")]
    pub speed_test_workers: usize,

    /// Trace endpoint location without scheme
    #[serde(default = "default_trace_url")]
    pub trace_url: String,

    /// Speed-test payload location without scheme
    #[serde(default = "default_speed_test_url")]
    pub speed_test_url: String,

    /// Probe and download over HTTPS
    #[serde(default = "default_enable_tls")]
    pub enable_tls: bool,

    /// Budget for each probe phase: connect, request, body read
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Budget for one speed-test download
    #[serde(default = "default_speed_test_timeout_ms")]
    pub speed_test_timeout_ms: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Render progress lines on stderr
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            output_file: default_output_file(),
            default_port: default_port(),
            max_concurrency: default_max_concurrency(),
            speed_test_workers: default_speed_test_workers(),
            trace_url: default_trace_url(),
            speed_test_url: default_speed_test_url(),
            enable_tls: default_enable_tls(),
            timeout_ms: default_timeout_ms(),
            speed_test_timeout_ms: default_speed_test_timeout_ms(),
            enable_color: default_enable_color(),
            show_progress: default_show_progress(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// TCP dial budget
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Budget for sending the trace request and receiving the response head
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Independent budget for reading the trace body
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Budget for one download measurement
    pub fn speed_test_timeout(&self) -> Duration {
        Duration::from_millis(self.speed_test_timeout_ms)
    }

    /// Whether the download stage runs at all
    pub fn speed_test_enabled(&self) -> bool {
        self.speed_test_workers > 0
    }

    /// Trace endpoint with the scheme chosen by the TLS flag
    pub fn trace_endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.trace_url, self.enable_tls)
    }

    /// Speed-test endpoint with the scheme chosen by the TLS flag
    pub fn speed_test_endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.speed_test_url, self.enable_tls)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.input_file.trim().is_empty() {
            return Err(AppError::config("Input file cannot be empty"));
        }

        if self.output_file.trim().is_empty() {
            return Err(AppError::config("Output file cannot be empty"));
        }

        if self.default_port == 0 {
            return Err(AppError::config("Default port must be between 1 and 65535"));
        }

        if self.max_concurrency == 0 {
            return Err(AppError::config("Max concurrency must be greater than 0"));
        }

        for (name, ms) in [("Timeout", self.timeout_ms), ("Speed test timeout", self.speed_test_timeout_ms)] {
            if ms == 0 {
                return Err(AppError::config(format!("{} must be greater than 0", name)));
            }
            if ms > 300_000 {
                return Err(AppError::config(format!("{} cannot exceed 300 seconds", name)));
            }
        }

        self.trace_endpoint()
            .map_err(|e| AppError::config(format!("Invalid trace URL '{}': {}", self.trace_url, e)))?;

        if self.speed_test_enabled() {
            self.speed_test_endpoint()
                .map_err(|e| AppError::config(format!("Invalid speed test URL '{}': {}", self.speed_test_url, e)))?;
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("EDGESCAN_INPUT_FILE") {
            self.input_file = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("EDGESCAN_OUTPUT_FILE") {
            self.output_file = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("EDGESCAN_PORT") {
            self.default_port = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_PORT value '{}': {}", value, e)))?;
        }

        if let Ok(value) = std::env::var("EDGESCAN_MAX_CONCURRENCY") {
            self.max_concurrency = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_MAX_CONCURRENCY value '{}': {}", value, e)))?;
        }

        if let Ok(value) = std::env::var("EDGESCAN_SPEED_TEST_WORKERS") {
            self.speed_test_workers = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_SPEED_TEST_WORKERS value '{}': {}", value, e)))?;
        }

        if let Ok(value) = std::env::var("EDGESCAN_TRACE_URL") {
            self.trace_url = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("EDGESCAN_SPEED_TEST_URL") {
            self.speed_test_url = value.trim().to_string();
        }

        if let Ok(value) = std::env::var("EDGESCAN_TLS") {
            self.enable_tls = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_TLS value '{}': {}", value, e)))?;
        }

        if let Ok(value) = std::env::var("EDGESCAN_TIMEOUT_SECONDS") {
            let secs: u64 = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
            self.timeout_ms = secs.saturating_mul(1000);
        }

        if let Ok(value) = std::env::var("EDGESCAN_SPEED_TIMEOUT_SECONDS") {
            let secs: u64 = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_SPEED_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
            self.speed_test_timeout_ms = secs.saturating_mul(1000);
        }

        if let Ok(value) = std::env::var("EDGESCAN_ENABLE_COLOR") {
            self.enable_color = value.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid EDGESCAN_ENABLE_COLOR value '{}': {}", value, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_input_file() -> String {
    crate::defaults::DEFAULT_INPUT_FILE.to_string()
}

fn default_output_file() -> String {
    crate::defaults::DEFAULT_OUTPUT_FILE.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_max_concurrency() -> usize {
    crate::defaults::DEFAULT_MAX_CONCURRENCY
}

fn default_speed_test_workers() -> usize {
    crate::defaults::DEFAULT_SPEED_TEST_WORKERS
}

fn default_trace_url() -> String {
    crate::defaults::DEFAULT_TRACE_URL.to_string()
}

fn default_speed_test_url() -> String {
    crate::defaults::DEFAULT_SPEED_TEST_URL.to_string()
}

fn default_enable_tls() -> bool {
    crate::defaults::DEFAULT_ENABLE_TLS
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_speed_test_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_SPEED_TEST_TIMEOUT.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_show_progress() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_port, 443);
        assert_eq!(config.max_concurrency, 100);
        assert_eq!(config.speed_test_workers, 5);
        assert!(config.enable_tls);
    }

    #[test]
    fn test_default_timeouts() {
        let config = Config::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.speed_test_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_port_invalid() {
        let config = Config { default_port: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_invalid() {
        let config = Config { max_concurrency: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_disables_speed_test() {
        let config = Config { speed_test_workers: 0, ..Default::default() };
        assert!(config.validate().is_ok());
        assert!(!config.speed_test_enabled());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = Config { timeout_ms: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_trace_url_invalid() {
        let config = Config { trace_url: "".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_url_ignored_when_disabled() {
        let config = Config {
            speed_test_workers: 0,
            speed_test_url: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoints_follow_tls_flag() {
        let config = Config { enable_tls: false, ..Default::default() };
        let trace = config.trace_endpoint().unwrap();
        assert_eq!(trace.url.as_str(), "http://speed.cloudflare.com/cdn-cgi/trace");

        let speed = config.speed_test_endpoint().unwrap();
        assert_eq!(speed.path_and_query, "/__down?bytes=500000000");
    }
}
