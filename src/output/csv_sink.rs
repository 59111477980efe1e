//! CSV export of the ranked result table

use crate::{
    error::{AppError, Result},
    models::ResultSet,
};
use std::path::Path;

const BASE_HEADERS: [&str; 4] = ["IP Address", "Port", "TLS", "Latency"];
const SPEED_HEADER: &str = "Download Speed";

/// Writes ranked results as CSV, one row per result in rank order
pub struct CsvResultSink;

impl CsvResultSink {
    /// Create (or truncate) `path` and write the table.
    ///
    /// Any failure is an export error; the results themselves are untouched.
    pub fn write(path: &Path, results: &ResultSet, tls: bool) -> Result<()> {
        let writer = csv::Writer::from_path(path)
            .map_err(|e| AppError::export(format!("Failed to create {}: {}", path.display(), e)))?;
        Self::write_to(writer, results, tls)
            .map_err(|e| AppError::export(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Render the table into memory
    pub fn render(results: &ResultSet, tls: bool) -> Result<String> {
        let mut buf = Vec::new();
        Self::write_to(csv::Writer::from_writer(&mut buf), results, tls)?;
        String::from_utf8(buf).map_err(|e| AppError::export(format!("CSV output is not UTF-8: {}", e)))
    }

    fn write_to<W: std::io::Write>(mut writer: csv::Writer<W>, results: &ResultSet, tls: bool) -> Result<()> {
        let tls = tls.to_string();

        match results {
            ResultSet::Latency(rows) => {
                writer.write_record(BASE_HEADERS)?;
                for row in rows {
                    let port = row.port.to_string();
                    writer.write_record([
                        row.address.as_str(),
                        port.as_str(),
                        tls.as_str(),
                        row.latency_label.as_str(),
                    ])?;
                }
            }
            ResultSet::Throughput(rows) => {
                writer.write_record(BASE_HEADERS.iter().chain(std::iter::once(&SPEED_HEADER)))?;
                for row in rows {
                    let port = row.probe.port.to_string();
                    let speed = row.speed_label();
                    writer.write_record([
                        row.probe.address.as_str(),
                        port.as_str(),
                        tls.as_str(),
                        row.probe.latency_label.as_str(),
                        speed.as_str(),
                    ])?;
                }
            }
        }

        writer.flush()?;
        Ok(())
    }
}
