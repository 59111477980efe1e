//! Download throughput measurement

use super::SpeedTester;
use crate::{
    defaults::USER_AGENT,
    error::{AppError, Result},
    logging::Logger,
    models::{Config, ProbeResult, SpeedTestResult},
    types::Endpoint,
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::lookup_host, time::Instant};

/// Streams the speed-test payload from one candidate and discards it
pub struct HttpSpeedTester {
    endpoint: Endpoint,
    timeout: Duration,
    connect_timeout: Duration,
    logger: Arc<Logger>,
}

/// Bytes received and the time it took, possibly cut short
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl Transfer {
    /// Kilobytes per second; zero for an empty or instantaneous transfer
    pub fn kbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.bytes == 0 || secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / 1024.0
    }
}

impl HttpSpeedTester {
    pub fn new(config: &Config, logger: Arc<Logger>) -> Result<Self> {
        Ok(Self {
            endpoint: config.speed_test_endpoint()?,
            timeout: config.speed_test_timeout(),
            connect_timeout: config.connect_timeout(),
            logger,
        })
    }

    /// Client whose only route to the payload host is `addr`.
    ///
    /// A fresh client per measurement means a fresh connection; nothing is
    /// pooled across candidates.
    fn client_for(&self, addr: SocketAddr) -> Result<Client> {
        Client::builder()
            .resolve(&self.endpoint.host, addr)
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(0)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build speed test client: {}", e)))
    }

    async fn transfer(&self, probe: &ProbeResult) -> Result<Transfer> {
        let addr = lookup_host((probe.address.as_str(), probe.port))
            .await?
            .next()
            .ok_or_else(|| AppError::network(format!("No address for {}", probe.address)))?;

        // resolve() ignores the port of the pinned address, so it goes on the URL
        let mut url = self.endpoint.url.clone();
        url.set_port(Some(probe.port))
            .map_err(|_| AppError::internal("speed test URL cannot carry a port"))?;

        let client = self.client_for(addr)?;
        let start = Instant::now();
        let response = client.get(url).send().await?;

        let mut bytes = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => bytes += chunk.len() as u64,
                // Deadline or reset mid-body: keep what arrived
                Err(_) => break,
            }
        }

        Ok(Transfer { bytes, elapsed: start.elapsed() })
    }
}

#[async_trait]
impl SpeedTester for HttpSpeedTester {
    async fn measure(&self, probe: &ProbeResult) -> SpeedTestResult {
        match self.transfer(probe).await {
            Ok(transfer) => {
                let result = SpeedTestResult::new(probe.clone(), transfer.kbps());
                self.logger.info("Speed test finished")
                    .speed(&result)
                    .field("bytes", transfer.bytes)
                    .log()
                    .await;
                result
            }
            Err(e) => {
                self.logger.info("Speed test failed")
                    .probe(probe)
                    .error_info(&e)
                    .field("reason", e.to_string())
                    .log()
                    .await;
                SpeedTestResult::failed(probe.clone())
            }
        }
    }
}
