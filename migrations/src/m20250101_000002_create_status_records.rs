use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_services::Services;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatusRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StatusRecords::ServiceId).uuid().not_null())
                    // "up" or "down"
                    .col(ColumnDef::new(StatusRecords::Status).string_len(8).not_null())
                    .col(
                        ColumnDef::new(StatusRecords::ResponseTimeMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StatusRecords::Timestamp)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_records_service_id")
                            .from(StatusRecords::Table, StatusRecords::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // History and latest-status lookups both filter by service and sort by time
        manager
            .create_index(
                Index::create()
                    .name("idx_status_records_service_timestamp")
                    .table(StatusRecords::Table)
                    .col(StatusRecords::ServiceId)
                    .col(StatusRecords::Timestamp)
                    .to_owned(),
            )
            .await?;

        log::info!("Created status_records table");

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StatusRecords {
    Table,
    Id,
    ServiceId,
    Status,
    ResponseTimeMs,
    Timestamp,
}
