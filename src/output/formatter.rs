//! Core formatting traits and implementations
//!
//! This module defines the console report interface and provides a plain
//! text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::ResultSet,
    stats::RunSummary,
};
use std::fmt::Write as _;
use std::time::Duration;

/// Console report formatting
pub trait ReportFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the run summary
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;

    /// Format the top `limit` rows of a ranked result set
    fn format_results_table(&self, results: &ResultSet, tls: bool, limit: usize) -> Result<String>;

    /// Notice for a run where nothing passed the trace check
    fn format_no_results(&self, attempted: usize) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show every row instead of the top few
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Rows shown when not verbose
    pub max_rows: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_rows: 10,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width: 4,
            max_width: 45,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Styles one padded cell; arguments are column index, row index and text
pub type CellStyler<'a> = &'a dyn Fn(usize, usize, &str) -> String;

/// Rank, address, port, TLS, latency and optionally speed for each row
pub fn result_rows(results: &ResultSet, tls: bool, limit: usize) -> (TableFormat, Vec<RowData>) {
    let mut columns = vec![
        Column::new("#", Alignment::Right),
        Column::new("IP Address", Alignment::Left),
        Column::new("Port", Alignment::Right),
        Column::new("TLS", Alignment::Center),
        Column::new("Colo", Alignment::Center),
        Column::new("Latency", Alignment::Right),
    ];
    if results.speed_test_ran() {
        columns.push(Column::new("Download Speed", Alignment::Right));
    }

    let rows = match results {
        ResultSet::Latency(rows) => rows
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, r)| {
                vec![
                    (i + 1).to_string(),
                    r.address.clone(),
                    r.port.to_string(),
                    tls.to_string(),
                    r.colo.clone(),
                    r.latency_label.clone(),
                ]
            })
            .collect(),
        ResultSet::Throughput(rows) => rows
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, r)| {
                vec![
                    (i + 1).to_string(),
                    r.probe.address.clone(),
                    r.probe.port.to_string(),
                    tls.to_string(),
                    r.probe.colo.clone(),
                    r.probe.latency_label.clone(),
                    r.speed_label(),
                ]
            })
            .collect(),
    };

    let format = TableFormat {
        columns,
        show_borders: true,
        show_header: true,
    };
    (format, rows)
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Rows shown in the console table
    pub fn row_limit(&self, total: usize) -> usize {
        if self.options.verbose_mode {
            total
        } else {
            self.options.max_rows.min(total)
        }
    }

    /// Create a table with the given format and data
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData], styler: Option<CellStyler<'_>>) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let show_borders = format.show_borders && self.options.table_borders;
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format, show_borders, None, 0));
            output.push('\n');

            if show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            output.push_str(&self.create_row(row, &column_widths, format, show_borders, styler, row_idx));
            output.push('\n');
        }

        if show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    /// Calculate optimal column widths
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        format.columns.iter().enumerate().map(|(col_idx, col)| {
            let content = rows.iter()
                .filter_map(|r| r.get(col_idx))
                .map(|cell| cell.len())
                .max()
                .unwrap_or(0);
            content.max(col.min_width).max(col.header.len()).min(col.max_width)
        }).collect()
    }

    fn create_row(
        &self,
        data: &[String],
        widths: &[usize],
        format: &TableFormat,
        show_borders: bool,
        styler: Option<CellStyler<'_>>,
        row_idx: usize,
    ) -> String {
        let mut row = String::new();

        if show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| &c.alignment).unwrap_or(&Alignment::Left);
            let padded = self.align_text(cell, width, alignment);
            let styled = match styler {
                Some(style) => style(idx, row_idx, &padded),
                None => padded,
            };

            if show_borders {
                row.push(' ');
            }
            row.push_str(&styled);
            if show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Align text within specified width
    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        if text.len() >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - text.len();
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{:.0}ms", ms)
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        let minutes = (ms / 60_000.0) as u32;
        let seconds = (ms % 60_000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

impl ReportFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}  ", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Scan Summary:").map_err(fmt_err)?;
        writeln!(output, "-------------").map_err(fmt_err)?;
        writeln!(output, "Candidates:       {}", summary.attempted).map_err(fmt_err)?;
        writeln!(output, "Reachable:        {} ({:.1}%)", summary.reachable, summary.reachable_rate()).map_err(fmt_err)?;
        if let Some(best) = summary.best_latency {
            writeln!(output, "Best Latency:     {} ms", best.as_millis()).map_err(fmt_err)?;
        }
        if let Some(mean) = summary.mean_latency {
            writeln!(output, "Mean Latency:     {} ms", mean.as_millis()).map_err(fmt_err)?;
        }
        if let Some(best) = summary.best_speed_kbps {
            writeln!(output, "Best Speed:       {:.0} kB/s", best).map_err(fmt_err)?;
        }
        if let Some(mean) = summary.mean_speed_kbps {
            writeln!(output, "Mean Speed:       {:.0} kB/s", mean).map_err(fmt_err)?;
            writeln!(output, "Failed Downloads: {}", summary.failed_speed_tests).map_err(fmt_err)?;
        }
        write!(output, "Elapsed:          {}", format_duration(summary.elapsed)).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_results_table(&self, results: &ResultSet, tls: bool, limit: usize) -> Result<String> {
        let (format, rows) = result_rows(results, tls, limit);
        Ok(self.create_table(&format, &rows, None))
    }

    fn format_no_results(&self, attempted: usize) -> Result<String> {
        Ok(format!("No reachable addresses found ({} candidates attempted)", attempted))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("[OK] {}", message))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("[WARN] {}", warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProbeResult, SpeedTestResult};

    fn plain() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions { enable_color: false, ..Default::default() })
    }

    fn probe(host: &str, ms: u64) -> ProbeResult {
        ProbeResult::new(host.to_string(), 443, Duration::from_millis(ms), "SJC".to_string())
    }

    #[test]
    fn test_latency_table() {
        let results = ResultSet::Latency(vec![probe("1.2.3.4", 12), probe("5.6.7.8", 40)]);
        let table = plain().format_results_table(&results, true, 10).unwrap();

        assert!(table.contains("IP Address"));
        assert!(!table.contains("Download Speed"));
        assert!(table.contains("1.2.3.4"));
        assert!(table.contains("12 ms"));
        assert_eq!(table.lines().count(), 6);
    }

    #[test]
    fn test_throughput_table_and_limit() {
        let results = ResultSet::Throughput(vec![
            SpeedTestResult::new(probe("1.1.1.1", 5), 2048.4),
            SpeedTestResult::failed(probe("2.2.2.2", 9)),
        ]);
        let table = plain().format_results_table(&results, false, 1).unwrap();

        assert!(table.contains("Download Speed"));
        assert!(table.contains("2048 kB/s"));
        assert!(!table.contains("2.2.2.2"));
    }

    #[test]
    fn test_row_limit() {
        let formatter = plain();
        assert_eq!(formatter.row_limit(3), 3);
        assert_eq!(formatter.row_limit(50), 10);

        let verbose = PlainFormatter::new(FormattingOptions { verbose_mode: true, ..Default::default() });
        assert_eq!(verbose.row_limit(50), 50);
    }

    #[test]
    fn test_empty_table() {
        assert!(plain().format_results_table(&ResultSet::Latency(vec![]), true, 10).unwrap().is_empty());
    }

    #[test]
    fn test_summary() {
        let results = ResultSet::Latency(vec![probe("1.2.3.4", 10), probe("5.6.7.8", 30)]);
        let summary = RunSummary::from_results(4, &results, Duration::from_millis(1500));
        let text = plain().format_summary(&summary).unwrap();

        assert!(text.contains("Candidates:       4"));
        assert!(text.contains("Reachable:        2 (50.0%)"));
        assert!(text.contains("Mean Latency:     20 ms"));
        assert!(text.contains("1.50s"));
        assert!(!text.contains("Best Speed"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
