use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Rejected input, reported before any store interaction.
    #[error("{0}")]
    Validation(String),

    #[error("Service not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored row that cannot be mapped back into the data model.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl MonitorError {
    pub fn validation(reason: impl Into<String>) -> Self {
        MonitorError::Validation(reason.into())
    }
}
