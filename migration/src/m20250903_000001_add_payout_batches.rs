use sea_orm_migration::prelude::*;
use sea_orm_migration::prelude::extension::postgres::Type;

/// Payout Batches (打款批次，processed_at 写入即视为已汇总)
#[derive(DeriveIden)]
enum PayoutBatches {
    Table,
    Id,
    Status,
    TotalCount,
    SuccessCount,
    FailureCount,
    ProcessedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payouts {
    Table,
    BatchId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("batch_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("completed"),
                        Alias::new("failed"),
                        Alias::new("partial"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayoutBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayoutBatches::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PayoutBatches::Status)
                            .custom(Alias::new("batch_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayoutBatches::TotalCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PayoutBatches::SuccessCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PayoutBatches::FailureCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PayoutBatches::ProcessedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PayoutBatches::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Payouts::Table)
                    .add_column(ColumnDef::new(Payouts::BatchId).big_integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Payouts::Table)
                    .drop_column(Payouts::BatchId)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PayoutBatches::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("batch_status")).to_owned())
            .await
    }
}
