pub mod models;

pub use models::{
    CheckOutcome, DisplayStatus, LatestStatus, ProbeStatus, Service, ServiceInput,
    ServiceSummary, StatusRecord, TimeBucket, UptimeHistory,
};
