//! Output formatting and export
//!
//! This module provides the console report (colored or plain text with table
//! formatting) and the CSV export of ranked results.

mod colored;
mod csv_sink;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, LatencyLevel};
pub use csv_sink::CsvResultSink;
pub use formatter::{
    Alignment, Column, FormattingOptions, PlainFormatter, ReportFormatter, RowData, TableFormat,
};

use crate::{
    error::Result,
    executor::ScanReport,
    models::Config,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn ReportFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Renders the end-of-run console report
pub struct ConsoleReport {
    formatter: Box<dyn ReportFormatter>,
    row_limit: Option<usize>,
    tls: bool,
}

impl ConsoleReport {
    pub fn new(config: &Config) -> Self {
        Self {
            formatter: OutputFormatterFactory::create_formatter(config.enable_color, config.verbose),
            row_limit: if config.verbose || config.debug { None } else { Some(FormattingOptions::default().max_rows) },
            tls: config.enable_tls,
        }
    }

    /// Header, top results and summary
    pub fn render(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();
        let limit = self.row_limit.unwrap_or(report.results.len()).min(report.results.len());

        output.push_str(&self.formatter.format_header("Edge Scan Results")?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_results_table(&report.results, self.tls, limit)?);
        output.push('\n');
        if limit < report.results.len() {
            output.push_str(&format!("... {} more in the CSV output\n", report.results.len() - limit));
        }
        output.push('\n');

        output.push_str(&self.formatter.format_summary(&report.summary)?);
        Ok(output)
    }

    pub fn render_no_results(&self, attempted: usize) -> Result<String> {
        self.formatter.format_no_results(attempted)
    }

    /// Final line naming the output file and elapsed time
    pub fn render_completion(&self, output_file: &str, elapsed_secs: f64) -> Result<String> {
        self.formatter.format_success(&format!(
            "Results written to {} in {:.2} seconds",
            output_file, elapsed_secs
        ))
    }

    pub fn render_warning(&self, warning: &str) -> Result<String> {
        self.formatter.format_warning(warning)
    }
}
