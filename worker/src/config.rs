use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,

    // Check cycles
    pub check_interval: Duration,
    pub probe_timeout: Duration,
    pub check_concurrency: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server_host = env::var("WORKER_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("WORKER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8081);

        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL environment variable must be set")?;

        // Seconds between cycles
        let check_interval_secs = env::var("CHECK_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(60);

        let probe_timeout_ms = env::var("PROBE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000);

        let check_concurrency = env::var("CHECK_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok());

        Ok(Self {
            server_host,
            server_port,
            database_url,
            check_interval: Duration::from_secs(check_interval_secs),
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            check_concurrency,
        })
    }
}
