use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use statusboard_shared::{CheckOutcome, Service};
use std::sync::Arc;

use crate::error::Result;
use crate::probe_service::ProbeService;
use crate::store::{NewStatusRecord, ServiceStore, StatusStore};

/// Result of one check cycle. `failed_writes` counts outcomes whose status
/// record could not be persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
    pub failed_writes: usize,
}

/// Runs check cycles: probe every registered service concurrently, persist each
/// outcome as soon as its probe finishes, return once all are done.
pub struct CheckService {
    probe_service: ProbeService,
    service_store: Arc<dyn ServiceStore>,
    status_store: Arc<dyn StatusStore>,
    max_concurrency: Option<usize>,
}

impl CheckService {
    pub fn new(
        probe_service: ProbeService,
        service_store: Arc<dyn ServiceStore>,
        status_store: Arc<dyn StatusStore>,
    ) -> Self {
        Self {
            probe_service,
            service_store,
            status_store,
            max_concurrency: None,
        }
    }

    /// Caps the number of probes in flight. `None` probes every service at once.
    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency.filter(|n| *n > 0);
        self
    }

    /// Checks every registered service. Only fails if the services cannot be listed.
    pub async fn run_check_cycle(&self) -> Result<CheckCycleReport> {
        let services = self.service_store.list_services().await?;
        Ok(self.check_services(&services).await)
    }

    /// Checks the given services. Outcomes are returned in input order.
    pub async fn check_services(&self, services: &[Service]) -> CheckCycleReport {
        let started_at = Utc::now();
        let limit = self.max_concurrency.unwrap_or(services.len()).max(1);

        // Owned elements: the cycle future must stay `Send` for `tokio::spawn`.
        let outcomes: Vec<CheckOutcome> = stream::iter(services.iter().cloned())
            .map(|service| self.check_service(service))
            .buffered(limit)
            .collect()
            .await;

        let failed_writes = outcomes.iter().filter(|o| !o.persisted).count();
        let finished_at = Utc::now();

        let up = outcomes
            .iter()
            .filter(|o| o.status == statusboard_shared::ProbeStatus::Up)
            .count();
        log::info!(
            "Check cycle finished in {}ms: {} services, {} up, {} down, {} failed writes",
            (finished_at - started_at).num_milliseconds(),
            outcomes.len(),
            up,
            outcomes.len() - up,
            failed_writes
        );

        CheckCycleReport {
            started_at,
            finished_at,
            outcomes,
            failed_writes,
        }
    }

    async fn check_service(&self, service: Service) -> CheckOutcome {
        let result = self.probe_service.probe(&service.url).await;
        log::debug!(
            "Service {} ({}) is {} after {}ms",
            service.name,
            service.id,
            result.status,
            result.response_time_ms
        );

        let record = NewStatusRecord {
            service_id: service.id,
            status: result.status,
            response_time_ms: result.response_time_ms,
        };
        let persisted = match self.status_store.insert(record).await {
            Ok(_) => true,
            Err(e) => {
                log::error!(
                    "Failed to record status for service {} ({}): {}",
                    service.name,
                    service.id,
                    e
                );
                false
            }
        };

        CheckOutcome {
            service: service.summary(),
            status: result.status,
            response_time_ms: result.response_time_ms,
            persisted,
        }
    }
}
