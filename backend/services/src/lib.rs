pub mod bucket_service;
pub mod check_service;
pub mod database;
pub mod database_store;
pub mod entity;
pub mod error;
pub mod memory_store;
pub mod probe_service;
pub mod query_service;
pub mod store;
pub mod validation;

pub use bucket_service::{anchor_for, bucketize, bucketize_at, uptime_percentage, ANCHOR_OFFSET_MINUTES};
pub use check_service::{CheckCycleReport, CheckService};
pub use database::create_connection;
pub use database_store::DatabaseStore;
pub use error::{MonitorError, Result};
pub use memory_store::MemoryStore;
pub use probe_service::{ProbeResult, ProbeService, DEFAULT_PROBE_TIMEOUT};
pub use query_service::QueryService;
pub use store::{HistoryRange, NewStatusRecord, ServiceStore, StatusStore};
pub use validation::ServiceDraft;

// Re-export entities for convenience
pub use entity::services;
pub use entity::status_records;
