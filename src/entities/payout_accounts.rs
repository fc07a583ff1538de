use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 支付通道
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payout_method")]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    #[sea_orm(string_value = "chime")]
    Chime,
    #[sea_orm(string_value = "paypal")]
    Paypal,
    #[sea_orm(string_value = "stripe")]
    Stripe,
}

impl std::fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutMethod::Chime => write!(f, "chime"),
            PayoutMethod::Paypal => write!(f, "paypal"),
            PayoutMethod::Stripe => write!(f, "stripe"),
        }
    }
}

/// 用户登记的收款账户（每用户每通道一条）
/// 对打款处理器只读，增删改属于账户管理功能
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payout_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub method: PayoutMethod,
    /// 通道内收款标识（paypal 邮箱 / stripe 账户ID / chime 标签）
    pub identifier: String,
    pub verified: bool,
    pub is_preferred: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
