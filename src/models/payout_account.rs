use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PayoutMethod, payout_account_entity as account_entity};

/// 登记/更新收款账户请求（同一用户同一通道为覆盖更新）
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterAccountRequest {
    pub method: PayoutMethod,
    /// 通道内收款标识（paypal 邮箱 / stripe 账户ID / chime 标签）
    pub identifier: String,
    /// 是否设为首选通道
    #[serde(default)]
    pub preferred: bool,
}

/// 收款账户响应（不向打款处理器之外暴露内部ID以外的敏感信息）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayoutAccountResponse {
    pub id: i64,
    pub method: PayoutMethod,
    pub identifier: String,
    pub verified: bool,
    pub is_preferred: bool,
    pub created_at: DateTime<Utc>,
}

impl From<account_entity::Model> for PayoutAccountResponse {
    fn from(m: account_entity::Model) -> Self {
        PayoutAccountResponse {
            id: m.id,
            method: m.method,
            identifier: m.identifier,
            verified: m.verified,
            is_preferred: m.is_preferred,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 路由解析结果: 该用户实际应走的通道与收款标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub method: PayoutMethod,
    pub identifier: String,
}
