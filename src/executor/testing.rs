//! Instrumented prober and speed tester fakes for pool tests

use crate::{
    client::{Prober, SpeedTester},
    logging::{LogLevel, Logger},
    models::{ProbeResult, SpeedTestResult},
    types::CandidateAddress,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

pub fn quiet_logger() -> Arc<Logger> {
    Arc::new(Logger::with_level("TEST", LogLevel::Fatal))
}

/// `10.0.0.1` through `10.0.0.<count>` on port 443
pub fn candidates(count: u8) -> Vec<CandidateAddress> {
    (1..=count)
        .map(|i| CandidateAddress::from_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, i)), 443))
        .collect()
}

/// Tracks the peak number of overlapping calls
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Prober answering from a fixed table of reachable hosts
pub struct FakeProber {
    /// `None` means every candidate is reachable
    reachable: Option<HashMap<String, Duration>>,
    delay: Duration,
    in_flight: InFlight,
}

impl FakeProber {
    pub fn all_reachable(delay: Duration) -> Self {
        Self { reachable: None, delay, in_flight: InFlight::default() }
    }

    pub fn reachable_hosts(hosts: &[&str], delay: Duration) -> Self {
        let table = hosts.iter().map(|h| (h.to_string(), Duration::from_millis(5))).collect();
        Self { reachable: Some(table), delay, in_flight: InFlight::default() }
    }

    /// Reachable hosts with the handshake latency each should report
    pub fn with_latencies(latencies: &[(&str, u64)]) -> Self {
        let table = latencies.iter()
            .map(|(h, ms)| (h.to_string(), Duration::from_millis(*ms)))
            .collect();
        Self { reachable: Some(table), delay: Duration::from_millis(1), in_flight: InFlight::default() }
    }

    pub fn none_reachable() -> Self {
        Self::reachable_hosts(&[], Duration::from_millis(1))
    }

    pub fn attempts(&self) -> usize {
        self.in_flight.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, candidate: &CandidateAddress) -> Option<ProbeResult> {
        self.in_flight.enter();
        tokio::time::sleep(self.delay).await;
        self.in_flight.exit();

        let latency = match &self.reachable {
            None => Duration::from_millis(5),
            Some(table) => *table.get(&candidate.host)?,
        };
        Some(ProbeResult::new(candidate.host.clone(), candidate.port, latency, "SJC".to_string()))
    }
}

/// Speed tester answering from a fixed table; unknown hosts fail with 0
pub struct FakeSpeedTester {
    speeds: HashMap<String, f64>,
    delay: Duration,
    in_flight: InFlight,
}

impl FakeSpeedTester {
    pub fn new(speeds: &[(&str, f64)], delay: Duration) -> Self {
        Self {
            speeds: speeds.iter().map(|(h, s)| (h.to_string(), *s)).collect(),
            delay,
            in_flight: InFlight::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.in_flight.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeedTester for FakeSpeedTester {
    async fn measure(&self, probe: &ProbeResult) -> SpeedTestResult {
        self.in_flight.enter();
        tokio::time::sleep(self.delay).await;
        self.in_flight.exit();

        match self.speeds.get(&probe.address) {
            Some(speed) => SpeedTestResult::new(probe.clone(), *speed),
            None => SpeedTestResult::failed(probe.clone()),
        }
    }
}
