//! Fixed-size worker pool draining the probe queue through the speed tester

use super::{probe_pool::ProbeQueue, progress::Progress};
use crate::{
    client::SpeedTester,
    logging::Logger,
    models::SpeedTestResult,
};
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinSet};

pub struct SpeedTestPool {
    tester: Arc<dyn SpeedTester>,
    workers: usize,
    show_progress: bool,
    logger: Arc<Logger>,
}

impl SpeedTestPool {
    pub fn new(tester: Arc<dyn SpeedTester>, workers: usize, show_progress: bool, logger: Arc<Logger>) -> Self {
        Self {
            tester,
            workers: workers.max(1),
            show_progress,
            logger,
        }
    }

    /// Measure every queued result.
    ///
    /// Workers stop once the closed queue is exhausted. Every queued result
    /// comes back exactly once, failed measurements included.
    pub async fn run(&self, queue: ProbeQueue) -> Vec<SpeedTestResult> {
        let total = queue.len();
        let rx = Arc::new(Mutex::new(queue.into_receiver()));
        let results = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let progress = Arc::new(Progress::new("Speed testing", total, self.show_progress));

        self.logger.info("Starting speed tests")
            .field("queued", total)
            .field("workers", self.workers)
            .log()
            .await;

        let mut workers = JoinSet::new();
        for _ in 0..self.workers.min(total.max(1)) {
            let rx = rx.clone();
            let results = results.clone();
            let progress = progress.clone();
            let tester = self.tester.clone();

            workers.spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(probe) = next else { break };

                    let result = tester.measure(&probe).await;
                    results.lock().await.push(result);
                    progress.tick();
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                self.logger.error("Speed test worker failed")
                    .field("reason", e.to_string())
                    .log()
                    .await;
            }
        }
        progress.finish();

        let mut guard = results.lock().await;
        std::mem::take(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{
        probe_pool::ProbePool,
        testing::{candidates, quiet_logger, FakeProber, FakeSpeedTester},
    };
    use std::time::Duration;

    async fn queue_of(count: u8) -> ProbeQueue {
        let prober = Arc::new(FakeProber::all_reachable(Duration::from_millis(1)));
        ProbePool::new(prober, 50, false, quiet_logger())
            .run(candidates(count))
            .await
    }

    #[tokio::test]
    async fn test_every_item_measured_once() {
        let tester = Arc::new(FakeSpeedTester::new(&[("10.0.0.1", 900.0)], Duration::from_millis(5)));
        let pool = SpeedTestPool::new(tester.clone(), 3, false, quiet_logger());

        let results = pool.run(queue_of(12).await).await;

        assert_eq!(results.len(), 12);
        assert_eq!(tester.calls(), 12);
        let mut hosts: Vec<_> = results.iter().map(|r| r.probe.address.clone()).collect();
        hosts.sort();
        hosts.dedup();
        assert_eq!(hosts.len(), 12);
    }

    #[tokio::test]
    async fn test_worker_count_bounds_concurrency() {
        let tester = Arc::new(FakeSpeedTester::new(&[], Duration::from_millis(10)));
        let pool = SpeedTestPool::new(tester.clone(), 2, false, quiet_logger());

        pool.run(queue_of(10).await).await;

        assert!(tester.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_failed_measurements_are_kept() {
        let tester = Arc::new(FakeSpeedTester::new(&[("10.0.0.2", 512.0)], Duration::from_millis(1)));
        let pool = SpeedTestPool::new(tester, 5, false, quiet_logger());

        let results = pool.run(queue_of(3).await).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.download_speed_kbps == 0.0).count(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let tester = Arc::new(FakeSpeedTester::new(&[], Duration::from_millis(1)));
        let pool = SpeedTestPool::new(tester.clone(), 5, false, quiet_logger());

        let results = pool.run(queue_of(0).await).await;

        assert!(results.is_empty());
        assert_eq!(tester.calls(), 0);
    }
}
