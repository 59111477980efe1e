//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
};
use colored::Colorize;

/// Ports on which CDN edges commonly answer HTTPS
const TLS_PORTS: [u16; 6] = [443, 2053, 2083, 2087, 2096, 8443];

/// Ports on which CDN edges commonly answer plain HTTP
const PLAIN_PORTS: [u16; 7] = [80, 8080, 8880, 2052, 2082, 2086, 2095];

/// Configuration validator with advisory rules on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        // Hard limits first
        config.validate()?;

        warnings.extend(Self::validate_port_scheme(config));
        warnings.extend(Self::validate_endpoints(config)?);
        warnings.extend(Self::validate_performance_settings(config));
        warnings.extend(Self::validate_paths(config));

        Ok(warnings)
    }

    /// Default port against the TLS flag
    fn validate_port_scheme(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let port = config.default_port;

        if config.enable_tls && PLAIN_PORTS.contains(&port) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("TLS is enabled but port {} normally serves plain HTTP", port),
            ));
        } else if !config.enable_tls && TLS_PORTS.contains(&port) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("TLS is disabled but port {} normally serves HTTPS", port),
            ));
        }

        warnings
    }

    /// Trace and speed-test endpoint checks
    fn validate_endpoints(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();
        let trace = config.trace_endpoint()?;

        if trace.url.port().is_some() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Trace URL '{}' names a port; probes always connect to the candidate's port",
                    config.trace_url
                ),
            ));
        }

        if config.speed_test_enabled() {
            let speed = config.speed_test_endpoint()?;
            if speed.host != trace.host {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Speed test host '{}' differs from trace host '{}'",
                        speed.host, trace.host
                    ),
                ));
            }
        }

        Ok(warnings)
    }

    /// Validate performance-related settings
    fn validate_performance_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.max_concurrency > 1000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrency of {} may exceed the open file limit; raise it with ulimit -n if probes fail",
                    config.max_concurrency
                ),
            ));
        }

        if config.timeout_ms < 2000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}ms may drop distant but working edges", config.timeout_ms),
            ));
        } else if config.timeout_ms > 30_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {}ms will slow down failure detection", config.timeout_ms),
            ));
        }

        if config.speed_test_enabled() {
            if config.speed_test_timeout_ms < config.timeout_ms {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Speed test timeout ({}ms) is shorter than the probe timeout ({}ms)",
                        config.speed_test_timeout_ms, config.timeout_ms
                    ),
                ));
            }

            if config.speed_test_workers > 64 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "{} parallel downloads share one link; measured speeds will be lower than each edge can deliver",
                        config.speed_test_workers
                    ),
                ));
            }

            if config.speed_test_workers > config.max_concurrency {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "{} speed test workers exceed the probe concurrency of {}",
                        config.speed_test_workers, config.max_concurrency
                    ),
                ));
            }
        }

        warnings
    }

    fn validate_paths(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.input_file == config.output_file {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!("Output file '{}' would overwrite the candidate list", config.output_file),
            ));
        }

        if !config.output_file.to_ascii_lowercase().ends_with(".csv") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Output file '{}' does not end in .csv", config.output_file),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "blue",
            Self::Warning => "yellow",
            Self::Error => "red",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
