use async_trait::async_trait;
use chrono::Utc;
use statusboard_shared::{Service, StatusRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{MonitorError, Result};
use crate::store::{
    next_record_timestamp, HistoryRange, NewStatusRecord, ServiceStore, StatusStore,
};
use crate::validation::ServiceDraft;

/// In-process store used by tests and as a fallback when no database is reachable.
/// History is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    services: Vec<Service>,
    /// Per-service history, oldest first.
    records: HashMap<Uuid, Vec<StatusRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let state = self.state.read().await;
        let mut services = state.services.clone();
        services.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        let state = self.state.read().await;
        Ok(state.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service> {
        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name: draft.name().to_string(),
            url: draft.url().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(&self, id: Uuid, draft: ServiceDraft) -> Result<Service> {
        let mut state = self.state.write().await;
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(MonitorError::NotFound(id))?;

        service.name = draft.name().to_string();
        service.url = draft.url().to_string();
        service.updated_at = Utc::now();
        Ok(service.clone())
    }

    async fn delete_service(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.services.len();
        state.services.retain(|s| s.id != id);
        if state.services.len() == before {
            return Err(MonitorError::NotFound(id));
        }
        state.records.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn insert(&self, record: NewStatusRecord) -> Result<StatusRecord> {
        let mut state = self.state.write().await;
        if !state.services.iter().any(|s| s.id == record.service_id) {
            return Err(MonitorError::NotFound(record.service_id));
        }

        let history = state.records.entry(record.service_id).or_default();
        let timestamp = next_record_timestamp(Utc::now(), history.last().map(|r| r.timestamp));

        let stored = StatusRecord {
            id: Uuid::new_v4(),
            service_id: record.service_id,
            status: record.status,
            response_time_ms: record.response_time_ms,
            timestamp,
        };
        history.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_service_in_range(
        &self,
        service_id: Uuid,
        range: HistoryRange,
    ) -> Result<Vec<StatusRecord>> {
        let state = self.state.read().await;
        let Some(history) = state.records.get(&service_id) else {
            return Ok(Vec::new());
        };

        Ok(history
            .iter()
            .rev()
            .filter(|r| range.contains(r.timestamp))
            .take(range.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_latest(&self, service_id: Uuid) -> Result<Option<StatusRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .get(&service_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn delete_all_for_service(&self, service_id: Uuid) -> Result<u64> {
        let mut state = self.state.write().await;
        Ok(state
            .records
            .remove(&service_id)
            .map(|history| history.len() as u64)
            .unwrap_or(0))
    }
}
