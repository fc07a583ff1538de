use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 获得抽奖资格的原因（闭集，新增需要迁移）
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_reason")]
#[serde(rename_all = "snake_case")]
pub enum EntryReason {
    #[sea_orm(string_value = "first_place_win")]
    FirstPlaceWin,
    #[sea_orm(string_value = "second_place_win")]
    SecondPlaceWin,
    #[sea_orm(string_value = "third_place_win")]
    ThirdPlaceWin,
    #[sea_orm(string_value = "base_submission")]
    BaseSubmission,
    #[sea_orm(string_value = "community_vote")]
    CommunityVote,
    #[sea_orm(string_value = "peoples_choice")]
    PeoplesChoice,
    #[sea_orm(string_value = "social_share")]
    SocialShare,
    #[sea_orm(string_value = "daily_login")]
    DailyLogin,
    #[sea_orm(string_value = "referral")]
    Referral,
    #[sea_orm(string_value = "manual_entry")]
    ManualEntry,
}

impl std::fmt::Display for EntryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryReason::FirstPlaceWin => write!(f, "first_place_win"),
            EntryReason::SecondPlaceWin => write!(f, "second_place_win"),
            EntryReason::ThirdPlaceWin => write!(f, "third_place_win"),
            EntryReason::BaseSubmission => write!(f, "base_submission"),
            EntryReason::CommunityVote => write!(f, "community_vote"),
            EntryReason::PeoplesChoice => write!(f, "peoples_choice"),
            EntryReason::SocialShare => write!(f, "social_share"),
            EntryReason::DailyLogin => write!(f, "daily_login"),
            EntryReason::Referral => write!(f, "referral"),
            EntryReason::ManualEntry => write!(f, "manual_entry"),
        }
    }
}

/// 抽奖资格发放记录（只增不改不删，审计凭证）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_grants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub reason_code: EntryReason,
    pub count: i64,
    pub competition_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
