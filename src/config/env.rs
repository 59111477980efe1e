//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                println!("Loaded configuration from .env file");
            }
        } else if debug {
            println!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "EDGESCAN_INPUT_FILE" | "EDGESCAN_OUTPUT_FILE" => {
                if value.is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "EDGESCAN_PORT" => {
                let port: u16 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid EDGESCAN_PORT value '{}': {}", value, e)))?;
                if port == 0 {
                    return Err(AppError::config("EDGESCAN_PORT must be between 1 and 65535"));
                }
            }
            "EDGESCAN_MAX_CONCURRENCY" => {
                let max: usize = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid EDGESCAN_MAX_CONCURRENCY value '{}': {}", value, e)))?;
                if max == 0 {
                    return Err(AppError::config("EDGESCAN_MAX_CONCURRENCY must be at least 1"));
                }
            }
            "EDGESCAN_SPEED_TEST_WORKERS" => {
                value.parse::<usize>()
                    .map_err(|e| AppError::config(format!("Invalid EDGESCAN_SPEED_TEST_WORKERS value '{}': {}", value, e)))?;
            }
            "EDGESCAN_SPEED_TEST_URL" | "EDGESCAN_TRACE_URL" => {
                if value.contains("://") {
                    url::Url::parse(value)
                        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                } else {
                    url::Url::parse(&format!("https://{}", value))
                        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                }
            }
            "EDGESCAN_TIMEOUT_SECONDS" | "EDGESCAN_SPEED_TIMEOUT_SECONDS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if timeout == 0 || timeout > 300 {
                    return Err(AppError::config(format!("{} must be between 1 and 300, got: {}", key, timeout)));
                }
            }
            "EDGESCAN_TLS" | "EDGESCAN_ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("EDGESCAN_INPUT_FILE", "Candidate list path", "ip.txt"),
            ("EDGESCAN_OUTPUT_FILE", "CSV output path", "ip.csv"),
            ("EDGESCAN_PORT", "Port for candidates without one (1-65535)", "443"),
            ("EDGESCAN_MAX_CONCURRENCY", "Maximum simultaneous probes (at least 1)", "100"),
            ("EDGESCAN_SPEED_TEST_WORKERS", "Speed-test workers, 0 disables", "5"),
            ("EDGESCAN_SPEED_TEST_URL", "Speed-test payload without scheme", "speed.cloudflare.com/__down?bytes=500000000"),
            ("EDGESCAN_TRACE_URL", "Trace endpoint without scheme", "speed.cloudflare.com/cdn-cgi/trace"),
            ("EDGESCAN_TLS", "Use HTTPS for probes and downloads", "true"),
            ("EDGESCAN_TIMEOUT_SECONDS", "Probe phase timeout in seconds (1-300)", "5"),
            ("EDGESCAN_SPEED_TIMEOUT_SECONDS", "Download timeout in seconds (1-300)", "10"),
            ("EDGESCAN_ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::{clear_env, ENV_LOCK};

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("EDGESCAN_PORT", "2053").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_MAX_CONCURRENCY", "1000").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_SPEED_TEST_WORKERS", "0").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_SPEED_TEST_WORKERS", "200").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_MAX_CONCURRENCY", "50000").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_TRACE_URL", "example.com/cdn-cgi/trace").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_TIMEOUT_SECONDS", " 10 ").is_ok());
        assert!(EnvManager::validate_env_var("EDGESCAN_TLS", "false").is_ok());

        assert!(EnvManager::validate_env_var("EDGESCAN_PORT", "0").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_PORT", "65536").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_MAX_CONCURRENCY", "0").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_SPEED_TEST_WORKERS", "-1").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_SPEED_TEST_WORKERS", "none").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_SPEED_TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("EDGESCAN_INPUT_FILE", "  ").is_err());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());
    }

    #[test]
    fn test_validate_current_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert!(EnvManager::validate_current_env().is_empty());

        std::env::set_var("EDGESCAN_PORT", "zero");
        let warnings = EnvManager::validate_current_env();
        clear_env();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("EDGESCAN_PORT"));
    }
}
