use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use statusboard_shared::{DisplayStatus, LatestStatus, Service, StatusRecord, UptimeHistory};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::bucket_service::{anchor_for, bucketize_at, uptime_percentage};
use crate::error::{MonitorError, Result};
use crate::store::{HistoryRange, ServiceStore, StatusStore};

/// Read side used by dashboards and the public status page.
pub struct QueryService {
    service_store: Arc<dyn ServiceStore>,
    status_store: Arc<dyn StatusStore>,
    uptime_page_size: u64,
}

impl QueryService {
    pub fn new(
        service_store: Arc<dyn ServiceStore>,
        status_store: Arc<dyn StatusStore>,
        uptime_page_size: u64,
    ) -> Self {
        Self {
            service_store,
            status_store,
            uptime_page_size: uptime_page_size.max(1),
        }
    }

    /// Latest known status for every service; `unknown` with 0ms when a service
    /// has no history yet.
    pub async fn latest_statuses(&self) -> Result<Vec<LatestStatus>> {
        let services = self.service_store.list_services().await?;

        try_join_all(services.iter().map(|service| async move {
            let latest = self.status_store.find_latest(service.id).await?;
            Ok::<_, MonitorError>(match latest {
                Some(record) => LatestStatus {
                    service: service.summary(),
                    status: record.status.into(),
                    response_time_ms: record.response_time_ms,
                    timestamp: Some(record.timestamp),
                },
                None => LatestStatus {
                    service: service.summary(),
                    status: DisplayStatus::Unknown,
                    response_time_ms: 0,
                    timestamp: None,
                },
            })
        }))
        .await
    }

    /// Newest-first history of the last `days` days, at most `limit` records.
    pub async fn status_history(
        &self,
        service_id: Uuid,
        days: u32,
        limit: u64,
    ) -> Result<Vec<StatusRecord>> {
        self.require_service(service_id).await?;
        self.status_store
            .find_by_service_in_range(service_id, HistoryRange::last_days(days, limit))
            .await
    }

    pub async fn uptime_history(
        &self,
        service_id: Uuid,
        days: u32,
        bucket_count: usize,
    ) -> Result<UptimeHistory> {
        self.uptime_history_at(service_id, days, bucket_count, Utc::now())
            .await
    }

    /// Bucketized history of the window ending at `now` minus the anchor offset.
    pub async fn uptime_history_at(
        &self,
        service_id: Uuid,
        days: u32,
        bucket_count: usize,
        now: DateTime<Utc>,
    ) -> Result<UptimeHistory> {
        self.require_service(service_id).await?;

        let anchor = anchor_for(now);
        let records = self
            .load_window(service_id, anchor - Duration::days(days as i64), anchor)
            .await?;

        let buckets = bucketize_at(&records, days, bucket_count, now);
        Ok(UptimeHistory {
            service_id,
            days,
            anchor,
            uptime_percentage: uptime_percentage(&buckets),
            buckets,
        })
    }

    /// Every record in `[start, end)`, read newest first in pages of
    /// `uptime_page_size`.
    async fn load_window(
        &self,
        service_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusRecord>> {
        let mut records: Vec<StatusRecord> = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut page_end = end;

        loop {
            let range = HistoryRange {
                start,
                end: Some(page_end),
                limit: self.uptime_page_size,
            };
            let page = self
                .status_store
                .find_by_service_in_range(service_id, range)
                .await?;
            let exhausted = (page.len() as u64) < self.uptime_page_size;
            let Some(oldest) = page.last().map(|r| r.timestamp) else {
                break;
            };

            let before = records.len();
            for record in page {
                if seen.insert(record.id) {
                    records.push(record);
                }
            }

            if exhausted {
                break;
            }
            // Continue from the oldest instant so records sharing it are not
            // lost. A page with nothing new steps strictly past that instant.
            page_end = if records.len() > before {
                (oldest + Duration::microseconds(1)).min(page_end)
            } else {
                oldest
            };
        }

        Ok(records)
    }

    async fn require_service(&self, service_id: Uuid) -> Result<Service> {
        self.service_store
            .get_service(service_id)
            .await?
            .ok_or(MonitorError::NotFound(service_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use crate::store::NewStatusRecord;
    use crate::validation::ServiceDraft;
    use statusboard_shared::ProbeStatus;

    fn query_service(store: Arc<MemoryStore>) -> QueryService {
        QueryService::new(store.clone(), store, 20_000)
    }

    async fn register(store: &MemoryStore, name: &str) -> Service {
        store
            .create_service(ServiceDraft::new(name, "https://status.example.com").unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn latest_defaults_to_unknown_without_history() {
        let store = Arc::new(MemoryStore::new());
        let quiet = register(&store, "quiet").await;
        let busy = register(&store, "busy").await;
        let _ = register(&store, "other").await;
        store
            .insert(NewStatusRecord {
                service_id: busy.id,
                status: ProbeStatus::Down,
                response_time_ms: 73,
            })
            .await
            .unwrap();

        let latest = query_service(store).latest_statuses().await.unwrap();

        assert_eq!(latest.len(), 3);
        let quiet_status = latest.iter().find(|l| l.service.id == quiet.id).unwrap();
        assert_eq!(quiet_status.status, DisplayStatus::Unknown);
        assert_eq!(quiet_status.response_time_ms, 0);
        assert!(quiet_status.timestamp.is_none());

        let busy_status = latest.iter().find(|l| l.service.id == busy.id).unwrap();
        assert_eq!(busy_status.status, DisplayStatus::Down);
        assert_eq!(busy_status.response_time_ms, 73);
    }

    #[tokio::test]
    async fn history_of_unknown_service_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let result = query_service(store.clone())
            .status_history(Uuid::new_v4(), 30, 500)
            .await;
        assert!(matches!(result, Err(MonitorError::NotFound(_))));

        let result = query_service(store)
            .uptime_history(Uuid::new_v4(), 7, 140)
            .await;
        assert!(matches!(result, Err(MonitorError::NotFound(_))));
    }

    #[tokio::test]
    async fn history_after_delete_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = register(&store, "gone").await;
        store
            .insert(NewStatusRecord {
                service_id: service.id,
                status: ProbeStatus::Up,
                response_time_ms: 5,
            })
            .await
            .unwrap();

        store.delete_service(service.id).await.unwrap();

        let result = query_service(store.clone())
            .status_history(service.id, 30, 500)
            .await;
        assert!(matches!(result, Err(MonitorError::NotFound(_))));
        let raw = store
            .find_by_service_in_range(service.id, HistoryRange::default())
            .await
            .unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn uptime_history_places_fresh_records_in_newest_bucket() {
        let store = Arc::new(MemoryStore::new());
        let service = register(&store, "api").await;
        store
            .insert(NewStatusRecord {
                service_id: service.id,
                status: ProbeStatus::Up,
                response_time_ms: 40,
            })
            .await
            .unwrap();

        // Evaluated a little later than the write so the record precedes the anchor.
        let later = Utc::now() + Duration::minutes(ANCHOR_SHIFT);
        let history = query_service(store)
            .uptime_history_at(service.id, 1, 24, later)
            .await
            .unwrap();

        assert_eq!(history.buckets.len(), 24);
        assert_eq!(history.anchor, anchor_for(later));
        let last = history.buckets.last().unwrap();
        assert_eq!(last.status, DisplayStatus::Up);
        assert_eq!(last.mean_response_time_ms, 40.0);
        assert_eq!(history.uptime_percentage, Some(100.0));
    }

    #[tokio::test]
    async fn uptime_history_reads_past_the_page_size() {
        let store = Arc::new(MemoryStore::new());
        let service = register(&store, "chatty").await;
        for i in 0..30 {
            store
                .insert(NewStatusRecord {
                    service_id: service.id,
                    status: if i == 0 { ProbeStatus::Down } else { ProbeStatus::Up },
                    response_time_ms: 10,
                })
                .await
                .unwrap();
        }

        let later = Utc::now() + Duration::minutes(ANCHOR_SHIFT);
        let history = QueryService::new(store.clone(), store, 10)
            .uptime_history_at(service.id, 1, 1, later)
            .await
            .unwrap();

        assert_eq!(history.buckets.len(), 1);
        assert_eq!(history.buckets[0].count, 30);
        // The oldest record is only reachable on the last page.
        assert_eq!(history.buckets[0].status, DisplayStatus::Down);
    }

    const ANCHOR_SHIFT: i64 = crate::bucket_service::ANCHOR_OFFSET_MINUTES + 5;
}
