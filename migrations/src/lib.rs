use sea_orm_migration::prelude::*;

pub mod m20250101_000001_create_services;
pub mod m20250101_000002_create_status_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_services::Migration),
            Box::new(m20250101_000002_create_status_records::Migration),
        ]
    }
}
