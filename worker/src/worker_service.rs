use statusboard_services::{CheckCycleReport, CheckService};
use std::sync::Arc;
use std::time::Duration;

/// Drives timer-based check cycles.
pub struct WorkerService {
    check_service: Arc<CheckService>,
    check_interval: Duration,
}

impl WorkerService {
    pub fn new(check_service: Arc<CheckService>, check_interval: Duration) -> Self {
        Self {
            check_service,
            check_interval,
        }
    }

    pub async fn start(&self) {
        log::info!("Worker service starting with configuration:");
        log::info!("  - Check interval: {:?}", self.check_interval);

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// Runs one cycle. Errors are logged; the next tick is the retry.
    pub async fn run_cycle(&self) -> Option<CheckCycleReport> {
        match self.check_service.run_check_cycle().await {
            Ok(report) => {
                if report.failed_writes > 0 {
                    log::warn!(
                        "{} of {} status records could not be written this cycle",
                        report.failed_writes,
                        report.outcomes.len()
                    );
                }
                Some(report)
            }
            Err(e) => {
                log::error!("Check cycle failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusboard_services::{
        HistoryRange, MemoryStore, ProbeService, ServiceDraft, ServiceStore, StatusStore,
        DEFAULT_PROBE_TIMEOUT,
    };
    use statusboard_shared::ProbeStatus;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn each_cycle_appends_one_record_per_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let service = store
            .create_service(ServiceDraft::new("api", &server.uri()).unwrap())
            .await
            .unwrap();
        let check_service = CheckService::new(
            ProbeService::new(DEFAULT_PROBE_TIMEOUT).unwrap(),
            store.clone(),
            store.clone(),
        );
        let worker = WorkerService::new(Arc::new(check_service), Duration::from_secs(60));

        for _ in 0..2 {
            let report = worker.run_cycle().await.unwrap();
            assert_eq!(report.outcomes.len(), 1);
        }

        let history = store
            .find_by_service_in_range(service.id, HistoryRange::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.status == ProbeStatus::Up));
        assert!(history[0].timestamp >= history[1].timestamp);
    }
}
