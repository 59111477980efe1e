//! Command-line interface

use clap::{ArgAction, Parser};

/// Edge Scanner - find reachable CDN edge addresses and rank them by latency or throughput
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "edgescan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Candidate list: one IP, IP:port or CIDR block per line [default: ip.txt]
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// CSV output file [default: ip.csv]
    #[arg(short = 'o', long = "outfile", value_name = "PATH")]
    pub outfile: Option<String>,

    /// Port used for candidates without one [default: 443]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Maximum concurrent probes [default: 100]
    #[arg(short = 'm', long = "max", value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Speed-test workers; 0 disables speed testing [default: 5]
    #[arg(short = 's', long = "speedtest", value_name = "N")]
    pub speed_test_workers: Option<usize>,

    /// Speed-test payload location without scheme [default: speed.cloudflare.com/__down?bytes=500000000]
    #[arg(long = "url", value_name = "HOST/PATH")]
    pub speed_test_url: Option<String>,

    /// Trace endpoint location without scheme [default: speed.cloudflare.com/cdn-cgi/trace]
    #[arg(long = "trace-url", value_name = "HOST/PATH")]
    pub trace_url: Option<String>,

    /// Probe and download over HTTPS [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub tls: Option<bool>,

    /// Per-phase probe timeout in seconds: connect, request and body read [default: 5]
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Speed-test download timeout in seconds [default: 10]
    #[arg(long = "speed-timeout", value_name = "SECS", value_parser = parse_duration)]
    pub speed_timeout: Option<u64>,

    /// Do not render progress lines
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if self.max_concurrency == Some(0) {
            return Err("--max must be at least 1".to_string());
        }

        if let (Some(file), Some(outfile)) = (&self.file, &self.outfile) {
            if file == outfile {
                return Err("--file and --outfile must be different paths".to_string());
            }
        }

        for (flag, value) in [("--url", &self.speed_test_url), ("--trace-url", &self.trace_url)] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(format!("{} cannot be empty", flag));
                }
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Summary of the flags that were given
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command-line Overrides:\n");
        if let Some(ref file) = self.file {
            summary.push_str(&format!("  Input file: {}\n", file));
        }
        if let Some(ref outfile) = self.outfile {
            summary.push_str(&format!("  Output file: {}\n", outfile));
        }
        if let Some(port) = self.port {
            summary.push_str(&format!("  Default port: {}\n", port));
        }
        if let Some(max) = self.max_concurrency {
            summary.push_str(&format!("  Max concurrency: {}\n", max));
        }
        if let Some(workers) = self.speed_test_workers {
            summary.push_str(&format!("  Speed test workers: {}\n", workers));
        }
        if let Some(tls) = self.tls {
            summary.push_str(&format!("  TLS: {}\n", tls));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
