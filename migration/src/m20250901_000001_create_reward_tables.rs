use sea_orm_migration::prelude::*;
use sea_orm_migration::prelude::extension::postgres::Type;

/// Entry Grants (资格发放记录，只增不改不删)
#[derive(DeriveIden)]
enum EntryGrants {
    Table,
    Id,
    UserId,
    ReasonCode,
    Count,
    CompetitionId,
    CreatedAt,
}

/// Entry Balances (用户资格余额，派生聚合)
#[derive(DeriveIden)]
enum EntryBalances {
    Table,
    Id,
    UserId,
    TotalEntries,
    UpdatedAt,
}

/// Jackpot Draws (抽奖期)
#[derive(DeriveIden)]
enum JackpotDraws {
    Table,
    Id,
    Name,
    PrizeAmountCents,
    WindowStart,
    WindowEnd,
    IsActive,
    WinnerUserId,
    WinningGrantId,
    DrawnAt,
    CreatedAt,
}

/// Payout Accounts (收款账户目录)
#[derive(DeriveIden)]
enum PayoutAccounts {
    Table,
    Id,
    UserId,
    Method,
    Identifier,
    Verified,
    IsPreferred,
    CreatedAt,
    UpdatedAt,
}

/// Payouts (待结算奖金)
#[derive(DeriveIden)]
enum Payouts {
    Table,
    Id,
    UserId,
    ContestId,
    NetAmountCents,
    Status,
    ExternalTransactionId,
    FailureReason,
    PaidAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Postgres ENUM types if not exists
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("entry_reason"))
                    .values(vec![
                        Alias::new("first_place_win"),
                        Alias::new("second_place_win"),
                        Alias::new("third_place_win"),
                        Alias::new("base_submission"),
                        Alias::new("community_vote"),
                        Alias::new("peoples_choice"),
                        Alias::new("social_share"),
                        Alias::new("daily_login"),
                        Alias::new("referral"),
                        Alias::new("manual_entry"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("payout_method"))
                    .values(vec![
                        Alias::new("chime"),
                        Alias::new("paypal"),
                        Alias::new("stripe"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("payout_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("processing"),
                        Alias::new("paid"),
                        Alias::new("failed"),
                    ])
                    .to_owned(),
            )
            .await?;

        // 资格发放记录表
        manager
            .create_table(
                Table::create()
                    .table(EntryGrants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntryGrants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntryGrants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntryGrants::ReasonCode)
                            .custom(Alias::new("entry_reason"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(EntryGrants::Count).big_integer().not_null())
                    .col(ColumnDef::new(EntryGrants::CompetitionId).big_integer())
                    .col(
                        ColumnDef::new(EntryGrants::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_grants_user_id")
                    .table(EntryGrants::Table)
                    .col(EntryGrants::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_grants_created_at")
                    .table(EntryGrants::Table)
                    .col(EntryGrants::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 用户资格余额表 (user_id 唯一，原子自增维护)
        manager
            .create_table(
                Table::create()
                    .table(EntryBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntryBalances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntryBalances::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EntryBalances::TotalEntries)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EntryBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 抽奖期表
        manager
            .create_table(
                Table::create()
                    .table(JackpotDraws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JackpotDraws::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JackpotDraws::Name).string().not_null())
                    .col(
                        ColumnDef::new(JackpotDraws::PrizeAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JackpotDraws::WindowStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JackpotDraws::WindowEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JackpotDraws::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(JackpotDraws::WinnerUserId).big_integer())
                    .col(ColumnDef::new(JackpotDraws::WinningGrantId).big_integer())
                    .col(ColumnDef::new(JackpotDraws::DrawnAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(JackpotDraws::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 收款账户表 (每用户每通道一条)
        manager
            .create_table(
                Table::create()
                    .table(PayoutAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayoutAccounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::Method)
                            .custom(Alias::new("payout_method"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::Identifier)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::IsPreferred)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PayoutAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payout_accounts_user_method")
                    .table(PayoutAccounts::Table)
                    .col(PayoutAccounts::UserId)
                    .col(PayoutAccounts::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 打款表
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payouts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payouts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::ContestId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payouts::NetAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payouts::Status)
                            .custom(Alias::new("payout_status"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payouts::ExternalTransactionId).string())
                    .col(ColumnDef::new(Payouts::FailureReason).text())
                    .col(ColumnDef::new(Payouts::PaidAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Payouts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Payouts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payouts_status")
                    .table(Payouts::Table)
                    .col(Payouts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payouts_user_id")
                    .table(Payouts::Table)
                    .col(Payouts::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayoutAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JackpotDraws::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EntryBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EntryGrants::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("payout_status")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("payout_method")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("entry_reason")).to_owned())
            .await
    }
}
