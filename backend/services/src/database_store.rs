use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use statusboard_shared::{ProbeStatus, Service, StatusRecord};
use uuid::Uuid;

use crate::entity::{services, status_records};
use crate::error::{MonitorError, Result};
use crate::store::{
    next_record_timestamp, HistoryRange, NewStatusRecord, ServiceStore, StatusStore,
};
use crate::validation::ServiceDraft;

/// PostgreSQL-backed store. Schema lives in the `migration` crate.
#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // Helper: Convert entity to Service
    fn entity_to_service(entity: services::Model) -> Service {
        Service {
            id: entity.id,
            name: entity.name,
            url: entity.url,
            created_at: entity.created_at.with_timezone(&Utc),
            updated_at: entity.updated_at.with_timezone(&Utc),
        }
    }

    // Helper: Convert entity to StatusRecord
    fn entity_to_status_record(entity: status_records::Model) -> Result<StatusRecord> {
        let status: ProbeStatus = entity.status.parse().map_err(|e| {
            MonitorError::CorruptRecord(format!("status record {}: {}", entity.id, e))
        })?;
        let response_time_ms = u64::try_from(entity.response_time_ms).map_err(|_| {
            MonitorError::CorruptRecord(format!(
                "status record {}: negative response time {}",
                entity.id, entity.response_time_ms
            ))
        })?;

        Ok(StatusRecord {
            id: entity.id,
            service_id: entity.service_id,
            status,
            response_time_ms,
            timestamp: entity.timestamp.with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl ServiceStore for DatabaseStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let services = services::Entity::find()
            .order_by_desc(services::Column::CreatedAt)
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await?;

        Ok(services.into_iter().map(Self::entity_to_service).collect())
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        let service = services::Entity::find_by_id(id).one(&self.db).await?;
        Ok(service.map(Self::entity_to_service))
    }

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service> {
        let now = Utc::now().fixed_offset();
        let model = services::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name().to_string()),
            url: Set(draft.url().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(Self::entity_to_service(model))
    }

    async fn update_service(&self, id: Uuid, draft: ServiceDraft) -> Result<Service> {
        let existing = services::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(MonitorError::NotFound(id))?;

        let mut active_model: services::ActiveModel = existing.into();
        active_model.name = Set(draft.name().to_string());
        active_model.url = Set(draft.url().to_string());
        active_model.updated_at = Set(Utc::now().fixed_offset());
        let model = active_model.update(&self.db).await?;

        Ok(Self::entity_to_service(model))
    }

    async fn delete_service(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        let history = status_records::Entity::delete_many()
            .filter(status_records::Column::ServiceId.eq(id))
            .exec(&txn)
            .await?;
        let deleted = services::Entity::delete_by_id(id).exec(&txn).await?;

        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Err(MonitorError::NotFound(id));
        }

        txn.commit().await?;
        log::info!(
            "Deleted service {} and {} status records",
            id,
            history.rows_affected
        );
        Ok(())
    }
}

#[async_trait]
impl StatusStore for DatabaseStore {
    async fn insert(&self, record: NewStatusRecord) -> Result<StatusRecord> {
        let txn = self.db.begin().await?;

        // Row lock on the service serializes appends for it, so timestamps
        // stay non-decreasing across concurrent cycles.
        if services::Entity::find_by_id(record.service_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .is_none()
        {
            txn.rollback().await?;
            return Err(MonitorError::NotFound(record.service_id));
        }

        let latest = status_records::Entity::find()
            .filter(status_records::Column::ServiceId.eq(record.service_id))
            .order_by_desc(status_records::Column::Timestamp)
            .one(&txn)
            .await?
            .map(|r| r.timestamp.with_timezone(&Utc));
        let timestamp = next_record_timestamp(Utc::now(), latest);

        let model = status_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(record.service_id),
            status: Set(record.status.as_str().to_string()),
            response_time_ms: Set(i64::try_from(record.response_time_ms).unwrap_or(i64::MAX)),
            timestamp: Set(timestamp.fixed_offset()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Self::entity_to_status_record(model)
    }

    async fn find_by_service_in_range(
        &self,
        service_id: Uuid,
        range: HistoryRange,
    ) -> Result<Vec<StatusRecord>> {
        let mut query = status_records::Entity::find()
            .filter(status_records::Column::ServiceId.eq(service_id))
            .filter(status_records::Column::Timestamp.gte(range.start.fixed_offset()));

        if let Some(end) = range.end {
            query = query.filter(status_records::Column::Timestamp.lt(end.fixed_offset()));
        }

        let records = query
            .order_by_desc(status_records::Column::Timestamp)
            .limit(range.limit)
            .all(&self.db)
            .await?;

        records
            .into_iter()
            .map(Self::entity_to_status_record)
            .collect()
    }

    async fn find_latest(&self, service_id: Uuid) -> Result<Option<StatusRecord>> {
        let record = status_records::Entity::find()
            .filter(status_records::Column::ServiceId.eq(service_id))
            .order_by_desc(status_records::Column::Timestamp)
            .one(&self.db)
            .await?;

        record.map(Self::entity_to_status_record).transpose()
    }

    async fn delete_all_for_service(&self, service_id: Uuid) -> Result<u64> {
        let result = status_records::Entity::delete_many()
            .filter(status_records::Column::ServiceId.eq(service_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
