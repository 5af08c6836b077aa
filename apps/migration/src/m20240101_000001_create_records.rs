use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Records {
    Table,
    Id,
    Kind,
    CreatedAt,
    Properties,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Records::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Records::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Records::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Records::Properties).json_binary().not_null())
                    .to_owned(),
            )
            .await?;

        // timeline reads filter by kind and sort by creation
        manager
            .create_index(
                Index::create()
                    .name("idx_records_kind_created_at")
                    .table(Records::Table)
                    .col(Records::Kind)
                    .col(Records::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await
    }
}
