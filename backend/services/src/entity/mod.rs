pub mod services;
pub mod status_records;
