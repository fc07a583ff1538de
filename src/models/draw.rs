use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::jackpot_draw_entity as draw_entity;

/// 创建抽奖期请求（管理侧）
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDrawRequest {
    pub name: String,
    /// 奖金（美分）
    pub prize_amount_cents: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// 抽奖期响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JackpotDrawResponse {
    pub id: i64,
    pub name: String,
    pub prize_amount_cents: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub is_active: bool,
    pub winner_user_id: Option<i64>,
    pub winning_grant_id: Option<i64>,
    pub drawn_at: Option<DateTime<Utc>>,
}

impl From<draw_entity::Model> for JackpotDrawResponse {
    fn from(m: draw_entity::Model) -> Self {
        JackpotDrawResponse {
            id: m.id,
            name: m.name,
            prize_amount_cents: m.prize_amount_cents,
            window_start: m.window_start,
            window_end: m.window_end,
            is_active: m.is_active,
            winner_user_id: m.winner_user_id,
            winning_grant_id: m.winning_grant_id,
            drawn_at: m.drawn_at,
        }
    }
}

/// 开奖结果（通知发送由调用方负责）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExecuteDrawResponse {
    pub draw_id: i64,
    pub winner_user_id: i64,
    pub winning_grant_id: i64,
    pub total_weight: i64,
    pub drawn_at: DateTime<Utc>,
}

/// 抽奖期列表查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DrawListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
