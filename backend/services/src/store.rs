use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use statusboard_shared::{ProbeStatus, Service, StatusRecord};
use uuid::Uuid;

use crate::error::Result;
use crate::validation::ServiceDraft;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const DEFAULT_HISTORY_LIMIT: u64 = 500;

/// A probe outcome ready to be appended. Id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStatusRecord {
    pub service_id: Uuid,
    pub status: ProbeStatus,
    pub response_time_ms: u64,
}

/// Range selector for history queries: `start <= timestamp < end`, newest first,
/// at most `limit` records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub limit: u64,
}

impl HistoryRange {
    pub fn last_days(days: u32, limit: u64) -> Self {
        Self::last_days_from(Utc::now(), days, limit)
    }

    pub fn last_days_from(now: DateTime<Utc>, days: u32, limit: u64) -> Self {
        Self {
            start: now - Duration::days(days as i64),
            end: None,
            limit,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && self.end.is_none_or(|end| timestamp < end)
    }
}

/// Timestamp for the next record of a service: wall-clock time, but never
/// earlier than the service's newest record.
pub fn next_record_timestamp(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    latest.map_or(now, |latest| now.max(latest))
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self::last_days(DEFAULT_HISTORY_DAYS, DEFAULT_HISTORY_LIMIT)
    }
}

/// Registry of monitored services.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    /// All services, most recently created first.
    async fn list_services(&self) -> Result<Vec<Service>>;

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>>;

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service>;

    async fn update_service(&self, id: Uuid, draft: ServiceDraft) -> Result<Service>;

    /// Removes the service together with its whole status history.
    async fn delete_service(&self, id: Uuid) -> Result<()>;
}

/// Append-only log of probe outcomes.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn insert(&self, record: NewStatusRecord) -> Result<StatusRecord>;

    async fn find_by_service_in_range(
        &self,
        service_id: Uuid,
        range: HistoryRange,
    ) -> Result<Vec<StatusRecord>>;

    async fn find_latest(&self, service_id: Uuid) -> Result<Option<StatusRecord>>;

    /// Returns the number of records removed.
    async fn delete_all_for_service(&self, service_id: Uuid) -> Result<u64>;
}
