//! Network clients for candidate probing and throughput measurement

pub mod speed;
pub mod tls;
pub mod trace;


use crate::{
    models::{ProbeResult, SpeedTestResult},
    types::CandidateAddress,
};
use async_trait::async_trait;

pub use speed::HttpSpeedTester;
pub use trace::TraceProber;

/// Liveness and latency check for a single candidate
///
/// Every failure mode (dial, request, body read, validation) collapses to
/// `None`; a prober never returns an error to its caller.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt the candidate exactly once
    async fn probe(&self, candidate: &CandidateAddress) -> Option<ProbeResult>;
}

/// Download benchmark for a validated candidate
///
/// Failures are reported as zero throughput so the candidate stays in the
/// result set.
#[async_trait]
pub trait SpeedTester: Send + Sync {
    async fn measure(&self, probe: &ProbeResult) -> SpeedTestResult;
}
