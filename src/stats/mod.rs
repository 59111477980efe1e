//! Result ranking and run summary statistics

use crate::models::{ProbeResult, ResultSet, SpeedTestResult};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, time::Duration};

/// Order a result set for export.
///
/// Throughput rows go fastest first, latency rows lowest first. Both sorts
/// are stable, so equal keys keep their incoming order and ranking an
/// already-ranked set changes nothing.
pub fn rank(results: ResultSet) -> ResultSet {
    match results {
        ResultSet::Latency(mut rows) => {
            sort_by_latency(&mut rows);
            ResultSet::Latency(rows)
        }
        ResultSet::Throughput(mut rows) => {
            sort_by_speed(&mut rows);
            ResultSet::Throughput(rows)
        }
    }
}

pub fn sort_by_latency(rows: &mut [ProbeResult]) {
    rows.sort_by_key(|r| r.handshake_latency);
}

pub fn sort_by_speed(rows: &mut [SpeedTestResult]) {
    rows.sort_by(|a, b| {
        b.download_speed_kbps
            .partial_cmp(&a.download_speed_kbps)
            .unwrap_or(Ordering::Equal)
    });
}

/// Aggregate figures for one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidates attempted after CIDR expansion
    pub attempted: usize,
    /// Candidates that passed the trace check
    pub reachable: usize,
    pub best_latency: Option<Duration>,
    pub mean_latency: Option<Duration>,
    /// Only present when the download stage ran
    pub best_speed_kbps: Option<f64>,
    pub mean_speed_kbps: Option<f64>,
    /// Speed tests that came back with zero throughput
    pub failed_speed_tests: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_results(attempted: usize, results: &ResultSet, elapsed: Duration) -> Self {
        let probes = results.probe_results();
        let latencies: Vec<Duration> = probes.iter().map(|p| p.handshake_latency).collect();

        let mean_latency = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<Duration>() / latencies.len() as u32)
        };

        let speeds = results.speeds();
        let (best_speed_kbps, mean_speed_kbps, failed_speed_tests) = match &speeds {
            Some(speeds) if !speeds.is_empty() => (
                Some(speeds.iter().copied().fold(f64::MIN, f64::max)),
                Some(speeds.iter().sum::<f64>() / speeds.len() as f64),
                speeds.iter().filter(|s| **s <= 0.0).count(),
            ),
            _ => (None, None, 0),
        };

        Self {
            attempted,
            reachable: results.len(),
            best_latency: latencies.iter().min().copied(),
            mean_latency,
            best_speed_kbps,
            mean_speed_kbps,
            failed_speed_tests,
            elapsed,
        }
    }

    /// Share of attempted candidates that were reachable, in percent
    pub fn reachable_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.reachable as f64 * 100.0 / self.attempted as f64
        }
    }
}
