//! Bounded-concurrency fan-out of the prober over all candidates

use super::progress::Progress;
use crate::{
    client::Prober,
    logging::Logger,
    models::ProbeResult,
    types::CandidateAddress,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    sync::{mpsc, Semaphore},
    task::JoinSet,
};

/// Validated probe results of a finished probe phase
///
/// Only produced once every probe task has completed, so the underlying
/// channel is already closed: receiving never waits and `None` means the
/// queue is exhausted.
#[derive(Debug)]
pub struct ProbeQueue {
    rx: mpsc::Receiver<ProbeResult>,
    len: usize,
}

impl ProbeQueue {
    /// Number of results the probe phase produced
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.rx.recv().await
    }

    /// Take every result, in completion order
    pub fn drain(mut self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.len);
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        results
    }

    pub(crate) fn into_receiver(self) -> mpsc::Receiver<ProbeResult> {
        self.rx
    }
}

/// Runs one prober task per candidate, at most `max_concurrency` at a time
pub struct ProbePool {
    prober: Arc<dyn Prober>,
    max_concurrency: usize,
    show_progress: bool,
    logger: Arc<Logger>,
}

impl ProbePool {
    pub fn new(prober: Arc<dyn Prober>, max_concurrency: usize, show_progress: bool, logger: Arc<Logger>) -> Self {
        Self {
            prober,
            max_concurrency: max_concurrency.max(1),
            show_progress,
            logger,
        }
    }

    /// Attempt every candidate once and return when all attempts are done
    pub async fn run(&self, candidates: Vec<CandidateAddress>) -> ProbeQueue {
        let total = candidates.len();
        // Sized to the candidate count so a send never waits
        let (tx, rx) = mpsc::channel(total.max(1));
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let progress = Arc::new(Progress::new("Probing", total, self.show_progress));
        let found = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let prober = self.prober.clone();
            let tx = tx.clone();
            let progress = progress.clone();
            let found = found.clone();

            tasks.spawn(async move {
                let _permit = permit;
                if let Some(result) = prober.probe(&candidate).await {
                    if tx.send(result).await.is_ok() {
                        found.fetch_add(1, Ordering::Relaxed);
                    }
                }
                progress.tick();
            });

            // Reap finished tasks so the set stays near the concurrency limit
            while let Some(joined) = tasks.try_join_next() {
                self.report_join(joined).await;
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.report_join(joined).await;
        }
        // Every sender clone has been dropped with its task; this closes the queue
        drop(tx);
        progress.finish();

        let len = found.load(Ordering::Relaxed);
        self.logger.info("Probe phase finished")
            .field("attempted", progress.completed())
            .field("reachable", len)
            .log()
            .await;

        ProbeQueue { rx, len }
    }

    async fn report_join(&self, joined: Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined {
            self.logger.error("Probe task failed")
                .field("reason", e.to_string())
                .log()
                .await;
        }
    }
}
