//! Two-phase scan pipeline
//!
//! This module contains the concurrent execution components:
//! - Semaphore-gated probe pool feeding a closed result queue
//! - Fixed-size speed-test worker pool draining that queue
//! - The pipeline that chains both phases and ranks the outcome

pub mod probe_pool;
pub mod progress;
pub mod speed_pool;

#[cfg(test)]
pub(crate) mod testing;

pub use probe_pool::{ProbePool, ProbeQueue};
pub use progress::Progress;
pub use speed_pool::SpeedTestPool;

use crate::{
    client::{HttpSpeedTester, Prober, SpeedTester, TraceProber},
    error::Result,
    logging::Logger,
    models::{Config, ResultSet},
    stats::{self, RunSummary},
    types::CandidateAddress,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Ranked results of a run that found at least one address
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub results: ResultSet,
    pub summary: RunSummary,
}

/// Terminal state of a run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing passed the trace check; not an error, and nothing to export
    NoReachableAddresses { attempted: usize, elapsed: Duration },
    Ranked(ScanReport),
}

/// Probe, optionally speed-test, then rank
pub struct ScanPipeline {
    config: Arc<Config>,
    prober: Arc<dyn Prober>,
    speed_tester: Option<Arc<dyn SpeedTester>>,
    logger: Arc<Logger>,
}

impl ScanPipeline {
    /// Pipeline over the real network clients
    pub fn new(config: Arc<Config>, logger: Arc<Logger>) -> Result<Self> {
        let prober: Arc<dyn Prober> = Arc::new(TraceProber::new(&config, logger.clone())?);
        let speed_tester: Option<Arc<dyn SpeedTester>> = if config.speed_test_enabled() {
            Some(Arc::new(HttpSpeedTester::new(&config, logger.clone())?))
        } else {
            None
        };

        Ok(Self::with_components(config, prober, speed_tester, logger))
    }

    pub fn with_components(
        config: Arc<Config>,
        prober: Arc<dyn Prober>,
        speed_tester: Option<Arc<dyn SpeedTester>>,
        logger: Arc<Logger>,
    ) -> Self {
        Self { config, prober, speed_tester, logger }
    }

    pub async fn run(&self, candidates: Vec<CandidateAddress>) -> RunOutcome {
        let start = Instant::now();
        let attempted = candidates.len();

        self.logger.info("Starting probe phase")
            .field("candidates", attempted)
            .field("max_concurrency", self.config.max_concurrency)
            .field("tls", self.config.enable_tls)
            .log()
            .await;

        let queue = ProbePool::new(
            self.prober.clone(),
            self.config.max_concurrency,
            self.config.show_progress,
            self.logger.clone(),
        )
        .run(candidates)
        .await;

        if queue.is_empty() {
            return RunOutcome::NoReachableAddresses { attempted, elapsed: start.elapsed() };
        }

        let results = match &self.speed_tester {
            Some(tester) if self.config.speed_test_enabled() => {
                let pool = SpeedTestPool::new(
                    tester.clone(),
                    self.config.speed_test_workers,
                    self.config.show_progress,
                    self.logger.clone(),
                );
                ResultSet::Throughput(pool.run(queue).await)
            }
            _ => ResultSet::Latency(queue.drain()),
        };

        let results = stats::rank(results);
        let summary = RunSummary::from_results(attempted, &results, start.elapsed());

        self.logger.info("Scan finished")
            .field("reachable", summary.reachable)
            .field("elapsed_ms", summary.elapsed.as_millis() as u64)
            .log()
            .await;

        RunOutcome::Ranked(ScanReport { results, summary })
    }
}
