use anyhow::{Context, Result};
use reqwest::Client;
use statusboard_shared::ProbeStatus;
use std::time::{Duration, Instant};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    /// Wall-clock time until classification, also measured on failure.
    pub response_time_ms: u64,
}

/// Issues single-attempt GET probes. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct ProbeService {
    client: Client,
    timeout: Duration,
}

impl ProbeService {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("statusboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn probe(&self, url: &str) -> ProbeResult {
        self.probe_with_timeout(url, self.timeout).await
    }

    /// Up iff a 2xx response arrives before `timeout`; everything else is down.
    /// Never retries.
    pub async fn probe_with_timeout(&self, url: &str, timeout: Duration) -> ProbeResult {
        let started = Instant::now();
        let response = tokio::time::timeout(timeout, self.client.get(url).send()).await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = match response {
            Ok(Ok(resp)) if resp.status().is_success() => ProbeStatus::Up,
            Ok(Ok(resp)) => {
                log::debug!("Probe {} returned {}", url, resp.status());
                ProbeStatus::Down
            }
            Ok(Err(e)) => {
                log::debug!("Probe {} failed: {}", url, e);
                ProbeStatus::Down
            }
            Err(_) => {
                log::debug!("Probe {} timed out after {:?}", url, timeout);
                ProbeStatus::Down
            }
        };

        ProbeResult {
            status,
            response_time_ms,
        }
    }
}
