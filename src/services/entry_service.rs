use crate::entities::{
    entry_balance_entity as balances, entry_grant_entity as grants,
    jackpot_draw_entity as draws,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    EntryBalanceResponse, EntryGrantResponse, EntryHistoryQuery, GrantEntriesRequest,
    GrantEntriesResponse, GrantItemResult, GrantMultipleResponse, JackpotDrawResponse,
    PaginatedResponse, PaginationParams,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 单次发放数量上限
pub const MAX_GRANT_COUNT: i64 = 1000;

/// 抽奖资格账本:
/// 发放记录只增不改，余额表只通过与发放同事务的原子自增维护，
/// 保证任意时刻 total_entries == Σ count
#[derive(Clone)]
pub struct EntryService {
    pool: DatabaseConnection,
}

impl EntryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 发放抽奖资格
    ///
    /// 插入发放记录并原子递增用户余额，两者在同一事务内提交，
    /// 读者不会看到只有其一生效的中间状态
    pub async fn grant_entries(
        &self,
        request: &GrantEntriesRequest,
    ) -> AppResult<GrantEntriesResponse> {
        validate_grant(request)?;

        let txn = self.pool.begin().await?;

        let grant = grants::ActiveModel {
            user_id: Set(request.user_id),
            reason_code: Set(request.reason_code),
            count: Set(request.count),
            competition_id: Set(request.competition_id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 余额行可能尚不存在，先做无冲突插入再做 SQL 级自增，
        // 并发发放同一用户时不会丢更新
        balances::Entity::insert(balances::ActiveModel {
            user_id: Set(request.user_id),
            total_entries: Set(0),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(balances::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        balances::Entity::update_many()
            .col_expr(
                balances::Column::TotalEntries,
                Expr::col(balances::Column::TotalEntries).add(request.count),
            )
            .col_expr(balances::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(balances::Column::UserId.eq(request.user_id))
            .exec(&txn)
            .await?;

        let new_total = balances::Entity::find()
            .filter(balances::Column::UserId.eq(request.user_id))
            .one(&txn)
            .await?
            .map(|b| b.total_entries)
            .ok_or_else(|| AppError::InternalError("Balance row missing after upsert".into()))?;

        txn.commit().await?;

        log::info!(
            "granted {} entries to user {} ({})",
            request.count,
            request.user_id,
            request.reason_code
        );

        Ok(GrantEntriesResponse {
            grant_id: grant.id,
            new_total,
        })
    }

    /// 批量发放: 逐条独立生效，单条失败不回滚其它条目
    pub async fn grant_multiple(
        &self,
        items: &[GrantEntriesRequest],
    ) -> AppResult<GrantMultipleResponse> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match self.grant_entries(item).await {
                Ok(res) => results.push(GrantItemResult {
                    user_id: item.user_id,
                    success: true,
                    grant_id: Some(res.grant_id),
                    new_total: Some(res.new_total),
                    error: None,
                }),
                Err(e) => results.push(GrantItemResult {
                    user_id: item.user_id,
                    success: false,
                    grant_id: None,
                    new_total: None,
                    error: Some(e.to_string()),
                }),
            }
        }
        Ok(GrantMultipleResponse { results })
    }

    /// 发放历史（倒序分页，时间相同按插入顺序）
    pub async fn get_entry_history(
        &self,
        user_id: i64,
        query: &EntryHistoryQuery,
    ) -> AppResult<PaginatedResponse<EntryGrantResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = grants::Entity::find().filter(grants::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(grants::Column::CreatedAt, Order::Desc)
            .order_by(grants::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<EntryGrantResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    /// 用户当前资格余额（无记录按 0 返回）
    pub async fn get_balance(&self, user_id: i64) -> AppResult<EntryBalanceResponse> {
        let total = balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .map(|b| b.total_entries)
            .unwrap_or(0);

        Ok(EntryBalanceResponse {
            user_id,
            total_entries: total,
        })
    }

    /// 当前进行中的抽奖期（is_active 且 now 在窗口内），没有则为 None
    pub async fn get_active_draw(&self) -> AppResult<Option<JackpotDrawResponse>> {
        let now = Utc::now();
        let draw = draws::Entity::find()
            .filter(draws::Column::IsActive.eq(true))
            .filter(draws::Column::WindowStart.lte(now))
            .filter(draws::Column::WindowEnd.gt(now))
            .order_by_asc(draws::Column::WindowEnd)
            .one(&self.pool)
            .await?;

        Ok(draw.map(Into::into))
    }
}

/// 发放请求校验（全部为调用方错误，不可重试）
fn validate_grant(request: &GrantEntriesRequest) -> AppResult<()> {
    if request.user_id <= 0 {
        return Err(AppError::ValidationError(
            "user_id must be a positive identifier".to_string(),
        ));
    }
    if request.count < 1 || request.count > MAX_GRANT_COUNT {
        return Err(AppError::ValidationError(format!(
            "count must be between 1 and {MAX_GRANT_COUNT}"
        )));
    }
    if let Some(competition_id) = request.competition_id
        && competition_id <= 0
    {
        return Err(AppError::ValidationError(
            "competition_id must be a positive identifier".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntryReason;

    fn request(user_id: i64, count: i64) -> GrantEntriesRequest {
        GrantEntriesRequest {
            user_id,
            reason_code: EntryReason::BaseSubmission,
            count,
            competition_id: None,
        }
    }

    #[test]
    fn test_validate_grant_accepts_range() {
        assert!(validate_grant(&request(1, 1)).is_ok());
        assert!(validate_grant(&request(1, 1000)).is_ok());
    }

    #[test]
    fn test_validate_grant_rejects_bad_count() {
        assert!(validate_grant(&request(1, 0)).is_err());
        assert!(validate_grant(&request(1, 1001)).is_err());
        assert!(validate_grant(&request(1, -5)).is_err());
    }

    #[test]
    fn test_validate_grant_rejects_bad_ids() {
        assert!(validate_grant(&request(0, 1)).is_err());
        assert!(validate_grant(&request(-1, 1)).is_err());

        let mut req = request(1, 1);
        req.competition_id = Some(0);
        assert!(validate_grant(&req).is_err());
    }
}
