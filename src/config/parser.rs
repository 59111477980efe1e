//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // Load from environment file if it exists
        EnvManager::load_env_file(self.cli.debug)?;

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ref file) = cli.file {
            config.input_file = file.clone();
        }
        if let Some(ref outfile) = cli.outfile {
            config.output_file = outfile.clone();
        }
        if let Some(port) = cli.port {
            config.default_port = port;
        }
        if let Some(max) = cli.max_concurrency {
            config.max_concurrency = max;
        }
        if let Some(workers) = cli.speed_test_workers {
            config.speed_test_workers = workers;
        }
        if let Some(ref url) = cli.speed_test_url {
            config.speed_test_url = url.trim().to_string();
        }
        if let Some(ref url) = cli.trace_url {
            config.trace_url = url.trim().to_string();
        }
        if let Some(tls) = cli.tls {
            config.enable_tls = tls;
        }
        if let Some(secs) = cli.timeout {
            config.timeout_ms = secs * 1000;
        }
        if let Some(secs) = cli.speed_timeout {
            config.speed_test_timeout_ms = secs * 1000;
        }

        if cli.no_color || !cli.use_colors() {
            config.enable_color = false;
        }
        if cli.no_progress {
            config.show_progress = false;
        }

        // CLI-only
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: port={}, max={}, speedtest={}, tls={}, timeout={}ms",
                config.default_port,
                config.max_concurrency,
                config.speed_test_workers,
                config.enable_tls,
                config.timeout_ms
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Input File: {}", config.input_file));
    summary.push(format!("Output File: {}", config.output_file));
    summary.push(format!("Default Port: {}", config.default_port));
    summary.push(format!("Max Concurrency: {}", config.max_concurrency));
    if config.speed_test_enabled() {
        summary.push(format!("Speed Test Workers: {}", config.speed_test_workers));
        summary.push(format!("Speed Test URL: {}", config.speed_test_url));
        summary.push(format!("Speed Test Timeout: {}ms", config.speed_test_timeout_ms));
    } else {
        summary.push("Speed Test: disabled".to_string());
    }
    summary.push(format!("Trace URL: {}", config.trace_url));
    summary.push(format!("TLS: {}", config.enable_tls));
    summary.push(format!("Timeout: {}ms", config.timeout_ms));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
