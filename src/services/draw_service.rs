use crate::entities::{entry_grant_entity as grants, jackpot_draw_entity as draws};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDrawRequest, DrawListQuery, ExecuteDrawResponse, JackpotDrawResponse,
    PaginatedResponse, PaginationParams,
};
use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 开奖引擎
///
/// 资格池取窗口内发放的记录（created_at ∈ [window_start, window_end]），
/// 用户权重为其窗口内 count 之和。中签写入使用
/// "winner_user_id IS NULL" 条件更新，并发重复开奖只会有一个成功
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建抽奖期（管理侧）
    pub async fn create_draw(&self, request: &CreateDrawRequest) -> AppResult<JackpotDrawResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("name must not be empty".into()));
        }
        if request.prize_amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "prize_amount_cents must be positive".into(),
            ));
        }
        if request.window_start >= request.window_end {
            return Err(AppError::ValidationError(
                "window_start must precede window_end".into(),
            ));
        }

        let draw = draws::ActiveModel {
            name: Set(request.name.trim().to_string()),
            prize_amount_cents: Set(request.prize_amount_cents),
            window_start: Set(request.window_start),
            window_end: Set(request.window_end),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(draw.into())
    }

    /// 抽奖期列表（倒序分页）
    pub async fn list_draws(
        &self,
        query: &DrawListQuery,
    ) -> AppResult<PaginatedResponse<JackpotDrawResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let total = draws::Entity::find().count(&self.pool).await? as i64;

        let items_models = draws::Entity::find()
            .order_by(draws::Column::WindowEnd, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<JackpotDrawResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    /// 开奖
    ///
    /// 1. 校验窗口已关闭且尚未开过
    /// 2. 取窗口内全部发放记录按 (user_id, id) 稳定排序
    /// 3. 在 [0, W) 上取密码学强度随机数，沿记录累加权重定位中签记录
    /// 4. 条件更新写入中签者，0 行生效说明并发方已开出 -> AlreadyDrawn
    ///
    /// 对已开出的抽奖期重复调用效果幂等（返回 AlreadyDrawn，不会重抽）
    pub async fn execute_draw(&self, draw_id: i64) -> AppResult<ExecuteDrawResponse> {
        let draw = draws::Entity::find_by_id(draw_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draw {draw_id} not found")))?;

        if draw.winner_user_id.is_some() {
            return Err(AppError::AlreadyDrawn);
        }
        let now = Utc::now();
        if !draw.window_closed(now) {
            return Err(AppError::WindowNotClosed);
        }

        let pool = grants::Entity::find()
            .filter(grants::Column::CreatedAt.gte(draw.window_start))
            .filter(grants::Column::CreatedAt.lte(draw.window_end))
            .order_by_asc(grants::Column::UserId)
            .order_by_asc(grants::Column::Id)
            .all(&self.pool)
            .await?;

        let weighted: Vec<(i64, i64, i64)> = pool
            .iter()
            .map(|g| (g.user_id, g.id, g.count))
            .collect();

        let total_weight: i64 = weighted.iter().map(|(_, _, count)| count).sum();
        if total_weight <= 0 {
            return Err(AppError::NoEligibleEntrants);
        }

        // ThreadRng 是会定期从操作系统熵源重播种的 CSPRNG，
        // 公平性与不可预测性是产品要求
        let roll = rand::thread_rng().gen_range(0..total_weight);
        let (winner_user_id, winning_grant_id) = pick_winning_grant(&weighted, roll)
            .ok_or_else(|| AppError::InternalError("Weighted walk exhausted the pool".into()))?;

        let drawn_at = Utc::now();
        let update_result = draws::Entity::update_many()
            .col_expr(draws::Column::WinnerUserId, Expr::value(Some(winner_user_id)))
            .col_expr(
                draws::Column::WinningGrantId,
                Expr::value(Some(winning_grant_id)),
            )
            .col_expr(draws::Column::DrawnAt, Expr::value(Some(drawn_at)))
            .col_expr(draws::Column::IsActive, Expr::value(false))
            .filter(draws::Column::Id.eq(draw_id))
            .filter(draws::Column::WinnerUserId.is_null())
            .exec(&self.pool)
            .await?;

        if update_result.rows_affected == 0 {
            // 并发调用方赢得了写入竞争
            return Err(AppError::AlreadyDrawn);
        }

        log::info!(
            "draw {draw_id} settled: winner user {winner_user_id} via grant {winning_grant_id} (W={total_weight})"
        );

        Ok(ExecuteDrawResponse {
            draw_id,
            winner_user_id,
            winning_grant_id,
            total_weight,
            drawn_at,
        })
    }

    /// 窗口已关闭但尚未开出的抽奖期ID（供后台扫描）
    pub async fn pending_draw_ids(&self) -> AppResult<Vec<i64>> {
        let now = Utc::now();
        let list = draws::Entity::find()
            .filter(draws::Column::WinnerUserId.is_null())
            .filter(draws::Column::WindowEnd.lte(now))
            .order_by_asc(draws::Column::WindowEnd)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(|d| d.id).collect())
    }
}

/// 沿稳定排序的记录累加权重，定位 roll 落入的发放记录
/// 返回 (user_id, grant_id)；用户的中签概率等于其记录 count 之和占总权重的比例
fn pick_winning_grant(weighted: &[(i64, i64, i64)], roll: i64) -> Option<(i64, i64)> {
    let mut acc = 0i64;
    for (user_id, grant_id, count) in weighted {
        acc += count;
        if roll < acc {
            return Some((*user_id, *grant_id));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_pick_walk_boundaries() {
        // 用户1: 资格 1 + 100 = 101, 用户2: 资格 1, W = 102
        let pool = vec![(1, 10, 1), (1, 11, 100), (2, 20, 1)];

        assert_eq!(pick_winning_grant(&pool, 0), Some((1, 10)));
        assert_eq!(pick_winning_grant(&pool, 1), Some((1, 11)));
        assert_eq!(pick_winning_grant(&pool, 100), Some((1, 11)));
        assert_eq!(pick_winning_grant(&pool, 101), Some((2, 20)));
        // roll 超出总权重不应命中任何记录
        assert_eq!(pick_winning_grant(&pool, 102), None);
    }

    #[test]
    fn test_pick_single_entrant() {
        let pool = vec![(7, 1, 3)];
        for roll in 0..3 {
            assert_eq!(pick_winning_grant(&pool, roll), Some((7, 1)));
        }
    }

    #[test]
    fn test_weighted_fairness_statistical() {
        // 用户1 权重 101 / 102, 用户2 权重 1 / 102
        let pool = vec![(1, 10, 1), (1, 11, 100), (2, 20, 1)];
        let total_weight = 102i64;
        let trials = 50_000;

        let mut wins: HashMap<i64, u32> = HashMap::new();
        let mut rng = rand::thread_rng();
        for _ in 0..trials {
            let roll = rng.gen_range(0..total_weight);
            let (user, _) = pick_winning_grant(&pool, roll).unwrap();
            *wins.entry(user).or_default() += 1;
        }

        let p1 = *wins.get(&1).unwrap_or(&0) as f64 / trials as f64;
        let expected = 101.0 / 102.0;
        assert!(
            (p1 - expected).abs() < 0.01,
            "user 1 won {p1}, expected about {expected}"
        );
        // 权重为正的用户在足够多次数下必然出现
        assert!(wins.contains_key(&2));
    }
}
