//! Probe and speed-test result data models

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A candidate that completed the handshake and returned a valid trace body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Host part of the candidate, without port
    pub address: String,
    /// Explicit candidate port, or the configured default
    pub port: u16,
    /// TCP dial start to connection established; excludes the HTTP exchange
    pub handshake_latency: Duration,
    /// Display form of the latency, e.g. `"42 ms"`
    pub latency_label: String,
    /// Edge-location code echoed by the trace endpoint
    pub colo: String,
}

impl ProbeResult {
    pub fn new(address: String, port: u16, handshake_latency: Duration, colo: String) -> Self {
        Self {
            address,
            port,
            latency_label: format_latency(handshake_latency),
            handshake_latency,
            colo,
        }
    }

    /// Handshake latency in fractional milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.handshake_latency.as_secs_f64() * 1000.0
    }
}

/// A probe result with its measured throughput
///
/// A speed of zero marks a failed download; the row is still kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    pub probe: ProbeResult,
    pub download_speed_kbps: f64,
}

impl SpeedTestResult {
    pub fn new(probe: ProbeResult, download_speed_kbps: f64) -> Self {
        Self { probe, download_speed_kbps }
    }

    pub fn failed(probe: ProbeResult) -> Self {
        Self::new(probe, 0.0)
    }

    /// Display form of the throughput, e.g. `"1234 kB/s"`
    pub fn speed_label(&self) -> String {
        format_speed(self.download_speed_kbps)
    }
}

/// The final rows of a run, shaped by whether the download stage ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultSet {
    /// Speed testing disabled; ordered by latency
    Latency(Vec<ProbeResult>),
    /// Speed testing ran; ordered by throughput
    Throughput(Vec<SpeedTestResult>),
}

impl ResultSet {
    pub fn len(&self) -> usize {
        match self {
            Self::Latency(rows) => rows.len(),
            Self::Throughput(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn speed_test_ran(&self) -> bool {
        matches!(self, Self::Throughput(_))
    }

    /// Probe results in current order
    pub fn probe_results(&self) -> Vec<&ProbeResult> {
        match self {
            Self::Latency(rows) => rows.iter().collect(),
            Self::Throughput(rows) => rows.iter().map(|r| &r.probe).collect(),
        }
    }

    /// Throughput figures in current order, if the download stage ran
    pub fn speeds(&self) -> Option<Vec<f64>> {
        match self {
            Self::Latency(_) => None,
            Self::Throughput(rows) => Some(rows.iter().map(|r| r.download_speed_kbps).collect()),
        }
    }
}

/// Whole milliseconds, truncated
pub fn format_latency(latency: Duration) -> String {
    format!("{} ms", latency.as_millis())
}

/// Rounded kilobytes per second
pub fn format_speed(kbps: f64) -> String {
    format!("{:.0} kB/s", kbps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(ms: u64) -> ProbeResult {
        ProbeResult::new("1.2.3.4".to_string(), 443, Duration::from_millis(ms), "SJC".to_string())
    }

    #[test]
    fn test_latency_label() {
        assert_eq!(probe(42).latency_label, "42 ms");
        let sub_ms = ProbeResult::new("a".into(), 1, Duration::from_micros(900), "X".into());
        assert_eq!(sub_ms.latency_label, "0 ms");
    }

    #[test]
    fn test_speed_label_rounds() {
        assert_eq!(SpeedTestResult::new(probe(1), 1234.4).speed_label(), "1234 kB/s");
        assert_eq!(SpeedTestResult::new(probe(1), 1234.6).speed_label(), "1235 kB/s");
        assert_eq!(SpeedTestResult::failed(probe(1)).speed_label(), "0 kB/s");
    }

    #[test]
    fn test_result_set_accessors() {
        let latency = ResultSet::Latency(vec![probe(10), probe(20)]);
        assert_eq!(latency.len(), 2);
        assert!(!latency.speed_test_ran());
        assert!(latency.speeds().is_none());

        let throughput = ResultSet::Throughput(vec![SpeedTestResult::new(probe(10), 5.0)]);
        assert!(throughput.speed_test_ran());
        assert_eq!(throughput.speeds(), Some(vec![5.0]));
        assert_eq!(throughput.probe_results()[0].address, "1.2.3.4");

        assert!(ResultSet::Latency(vec![]).is_empty());
    }
}
