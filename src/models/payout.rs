use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{BatchStatus, PayoutStatus, payout_entity};

/// 赛事结算入账请求（批量创建 pending 打款）
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePayoutsRequest {
    pub payouts: Vec<CreatePayoutItem>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePayoutItem {
    pub user_id: i64,
    pub contest_id: i64,
    /// 应结净额（美分）
    pub net_amount_cents: i64,
}

/// 认领请求: 把 pending 打款圈进一个批次
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClaimBatchRequest {
    pub payout_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimBatchResponse {
    /// 没有认领到任何条目时批次会被直接丢弃，此时为 null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    /// 实际认领条数（已被其它批次抢走或已终态的不计入）
    pub claimed_count: u64,
}

///// 处理请求: 只处理指定批次认领到的条目
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProcessBatchRequest {
    pub batch_id: i64,
}

/// 单笔打款的处理结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayoutItemResult {
    pub payout_id: i64,
    pub user_id: i64,
    pub status: PayoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// 失败是否可通过重新入批重试（传输类失败为 true，账户/拒付类为 false）
    pub retryable: bool,
}

/// 批次处理的整体返回: 调用方必须检查 per-item 明细而不是依赖整体异常
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResult {
    pub batch_id: i64,
    pub batch_status: BatchStatus,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<PayoutItemResult>,
}

/// 打款列表查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PayoutListQuery {
    pub user_id: Option<i64>,
    pub status: Option<PayoutStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 打款记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayoutResponse {
    pub id: i64,
    pub user_id: i64,
    pub contest_id: i64,
    pub net_amount_cents: i64,
    pub status: PayoutStatus,
    pub batch_id: Option<i64>,
    pub external_transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<payout_entity::Model> for PayoutResponse {
    fn from(m: payout_entity::Model) -> Self {
        PayoutResponse {
            id: m.id,
            user_id: m.user_id,
            contest_id: m.contest_id,
            net_amount_cents: m.net_amount_cents,
            status: m.status,
            batch_id: m.batch_id,
            external_transaction_id: m.external_transaction_id,
            failure_reason: m.failure_reason,
            paid_at: m.paid_at,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}
