use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖期（一个开奖窗口）
/// winner_user_id 只允许从 NULL 变为某个值一次，之后不可重开
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "jackpot_draws")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub prize_amount_cents: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub is_active: bool,
    pub winner_user_id: Option<i64>,
    pub winning_grant_id: Option<i64>,
    pub drawn_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 窗口是否已关闭（可以开奖）
    pub fn window_closed(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_end
    }

    /// 当前是否处于进行中的窗口内
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_start && now < self.window_end
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
