//! Colored formatter implementation with terminal color support
//!
//! Latency and throughput cells are color coded by how good the figure is;
//! layout is shared with the plain formatter.

use super::formatter::{
    format_duration, result_rows, FormattingOptions, PlainFormatter, ReportFormatter,
};
use crate::{
    error::Result,
    models::ResultSet,
    stats::RunSummary,
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-200ms
    Poor,       // 200-500ms
    VeryPoor,   // > 500ms
}

impl LatencyLevel {
    pub fn from_millis(ms: f64) -> Self {
        if ms < 50.0 {
            Self::Excellent
        } else if ms < 100.0 {
            Self::Good
        } else if ms < 200.0 {
            Self::Fair
        } else if ms < 500.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }
}

/// Color for a throughput figure; zero marks a failed download
pub fn speed_color(kbps: f64) -> Color {
    if kbps <= 0.0 {
        Color::Red
    } else if kbps < 1024.0 {
        Color::Yellow
    } else if kbps < 10.0 * 1024.0 {
        Color::Cyan
    } else {
        Color::Green
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let header = self.plain_formatter.format_header(title)?;
        if self.options.enable_color {
            Ok(header.color(self.color_scheme.header).bold().to_string())
        } else {
            Ok(header)
        }
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();
        let err = |e: std::fmt::Error| crate::error::AppError::internal(format!("Failed to format summary: {}", e));

        writeln!(output, "{}", self.bold("Scan Summary:")).map_err(err)?;
        writeln!(output, "{}", self.colorize("-------------", self.color_scheme.muted)).map_err(err)?;
        writeln!(output, "Candidates:       {}", summary.attempted).map_err(err)?;

        let rate = format!("{} ({:.1}%)", summary.reachable, summary.reachable_rate());
        let rate_color = if summary.reachable > 0 { self.color_scheme.success } else { self.color_scheme.warning };
        writeln!(output, "Reachable:        {}", self.colorize(&rate, rate_color)).map_err(err)?;

        if let Some(best) = summary.best_latency {
            let ms = best.as_secs_f64() * 1000.0;
            let text = format!("{} ms", best.as_millis());
            writeln!(output, "Best Latency:     {}", self.colorize(&text, LatencyLevel::from_millis(ms).color())).map_err(err)?;
        }
        if let Some(mean) = summary.mean_latency {
            let ms = mean.as_secs_f64() * 1000.0;
            let text = format!("{} ms", mean.as_millis());
            writeln!(output, "Mean Latency:     {}", self.colorize(&text, LatencyLevel::from_millis(ms).color())).map_err(err)?;
        }
        if let Some(best) = summary.best_speed_kbps {
            let text = format!("{:.0} kB/s", best);
            writeln!(output, "Best Speed:       {}", self.colorize(&text, speed_color(best))).map_err(err)?;
        }
        if let Some(mean) = summary.mean_speed_kbps {
            let text = format!("{:.0} kB/s", mean);
            writeln!(output, "Mean Speed:       {}", self.colorize(&text, speed_color(mean))).map_err(err)?;
            writeln!(output, "Failed Downloads: {}", summary.failed_speed_tests).map_err(err)?;
        }
        write!(output, "Elapsed:          {}", format_duration(summary.elapsed)).map_err(err)?;

        Ok(output)
    }

    fn format_results_table(&self, results: &ResultSet, tls: bool, limit: usize) -> Result<String> {
        let (format, rows) = result_rows(results, tls, limit);
        let probes = results.probe_results();
        let speeds = results.speeds();

        let styler = |col: usize, row: usize, cell: &str| -> String {
            match col {
                5 => match probes.get(row) {
                    Some(p) => self.colorize(cell, LatencyLevel::from_millis(p.latency_ms()).color()).to_string(),
                    None => cell.to_string(),
                },
                6 => match speeds.as_ref().and_then(|s| s.get(row)) {
                    Some(kbps) => self.colorize(cell, speed_color(*kbps)).to_string(),
                    None => cell.to_string(),
                },
                _ => cell.to_string(),
            }
        };

        Ok(self.plain_formatter.create_table(&format, &rows, Some(&styler)))
    }

    fn format_no_results(&self, attempted: usize) -> Result<String> {
        let text = self.plain_formatter.format_no_results(attempted)?;
        Ok(self.colorize(&text, self.color_scheme.warning).to_string())
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✓", self.color_scheme.success), message))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("⚠", self.color_scheme.warning), warning))
    }
}
