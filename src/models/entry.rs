use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{EntryReason, entry_grant_entity as grant_entity};

/// 发放抽奖资格请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GrantEntriesRequest {
    pub user_id: i64,
    /// 发放原因（闭集，非法值在反序列化阶段即被拒绝）
    pub reason_code: EntryReason,
    /// 发放数量 (1 ~ 1000)
    pub count: i64,
    /// 关联的赛事ID（可选）
    pub competition_id: Option<i64>,
}

/// 发放结果: 返回新纪录ID与该用户发放后的总资格数，
/// 调用方无需再次查询即可展示最新数值
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GrantEntriesResponse {
    pub grant_id: i64,
    pub new_total: i64,
}

/// 批量发放请求（逐条独立生效，互不回滚）
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantMultipleRequest {
    pub grants: Vec<GrantEntriesRequest>,
}

/// 批量发放的单项结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GrantItemResult {
    pub user_id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GrantMultipleResponse {
    pub results: Vec<GrantItemResult>,
}

/// 资格发放历史查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct EntryHistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 资格发放记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryGrantResponse {
    pub id: i64,
    pub reason_code: EntryReason,
    pub count: i64,
    pub competition_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<grant_entity::Model> for EntryGrantResponse {
    fn from(m: grant_entity::Model) -> Self {
        EntryGrantResponse {
            id: m.id,
            reason_code: m.reason_code,
            count: m.count,
            competition_id: m.competition_id,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 用户当前资格余额
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryBalanceResponse {
    pub user_id: i64,
    pub total_entries: i64,
}
