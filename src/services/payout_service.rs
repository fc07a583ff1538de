use crate::entities::{
    BatchStatus, PayoutStatus, payout_batch_entity as batches, payout_entity as payouts,
};
use crate::error::{AppError, AppResult};
use crate::external::{AdapterRegistry, Notifier, ProviderError};
use crate::models::{
    BatchResult, ClaimBatchResponse, CreatePayoutItem, PaginatedResponse, PaginationParams,
    PayoutItemResult, PayoutListQuery, PayoutResponse,
};
use crate::services::PayoutAccountService;
use chrono::Utc;
use futures_util::StreamExt;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::time::Duration;

const NO_ACCOUNT_REASON: &str = "no payout account configured";

/// 打款处理器
///
/// 单条打款的状态流转各自原子（条件更新），一条失败不影响批内其它条目；
/// 认领（pending -> processing）是并发边界，两个批任务不可能抢到同一笔
#[derive(Clone)]
pub struct PayoutService {
    pool: DatabaseConnection,
    accounts: PayoutAccountService,
    adapters: AdapterRegistry,
    notifier: Notifier,
    send_timeout: Duration,
    concurrency: usize,
}

impl PayoutService {
    pub fn new(
        pool: DatabaseConnection,
        accounts: PayoutAccountService,
        adapters: AdapterRegistry,
        notifier: Notifier,
        send_timeout_secs: u64,
        concurrency: usize,
    ) -> Self {
        Self {
            pool,
            accounts,
            adapters,
            notifier,
            send_timeout: Duration::from_secs(send_timeout_secs.max(1)),
            concurrency: concurrency.max(1),
        }
    }

    /// 赛事结算入账: 批量创建 pending 打款
    pub async fn create_payouts(
        &self,
        items: &[CreatePayoutItem],
    ) -> AppResult<Vec<PayoutResponse>> {
        if items.is_empty() {
            return Err(AppError::ValidationError("payouts must not be empty".into()));
        }
        for item in items {
            if item.user_id <= 0 || item.contest_id <= 0 {
                return Err(AppError::ValidationError(
                    "user_id and contest_id must be positive identifiers".into(),
                ));
            }
            if item.net_amount_cents <= 0 {
                return Err(AppError::ValidationError(
                    "net_amount_cents must be positive".into(),
                ));
            }
        }

        let mut created = Vec::with_capacity(items.len());
        let txn = self.pool.begin().await?;
        for item in items {
            let model = payouts::ActiveModel {
                user_id: Set(item.user_id),
                contest_id: Set(item.contest_id),
                net_amount_cents: Set(item.net_amount_cents),
                status: Set(PayoutStatus::Pending),
                created_at: Set(Some(Utc::now())),
                updated_at: Set(Some(Utc::now())),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(model.into());
        }
        txn.commit().await?;
        Ok(created)
    }

    /// 把 pending 打款认领进一个新批次
    ///
    /// 认领是 "status = pending 才改" 的条件更新，已被其它批次
    /// 抢走或已终态的条目不会被计入，两个并发批任务不可能双付
    pub async fn claim_payouts_for_batch(
        &self,
        payout_ids: &[i64],
    ) -> AppResult<ClaimBatchResponse> {
        if payout_ids.is_empty() {
            return Err(AppError::ValidationError(
                "payout_ids must not be empty".into(),
            ));
        }

        let txn = self.pool.begin().await?;

        let batch = batches::ActiveModel {
            status: Set(BatchStatus::Pending),
            total_count: Set(0),
            success_count: Set(0),
            failure_count: Set(0),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let claim = payouts::Entity::update_many()
            // 枚举列需要显式转换，否则参数按 text 绑定会被 Postgres 拒绝
            .col_expr(payouts::Column::Status, PayoutStatus::Processing.as_enum())
            .col_expr(payouts::Column::BatchId, Expr::value(Some(batch.id)))
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(payouts::Column::Id.is_in(payout_ids.to_vec()))
            .filter(payouts::Column::Status.eq(PayoutStatus::Pending))
            .exec(&txn)
            .await?;

        if claim.rows_affected == 0 {
            // 全部已被其它批次抢走或已终态，空批次直接丢弃
            batches::Entity::delete_by_id(batch.id).exec(&txn).await?;
            txn.commit().await?;
            log::info!("no payouts claimed, discarded empty batch {}", batch.id);
            return Ok(ClaimBatchResponse {
                batch_id: None,
                claimed_count: 0,
            });
        }

        let mut batch_am = batch.clone().into_active_model();
        batch_am.total_count = Set(claim.rows_affected as i64);
        batch_am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "batch {} claimed {}/{} payouts",
            batch.id,
            claim.rows_affected,
            payout_ids.len()
        );

        Ok(ClaimBatchResponse {
            batch_id: Some(batch.id),
            claimed_count: claim.rows_affected,
        })
    }

    /// 处理一个批次
    ///
    /// 只处理该批次认领到的、当前仍处于 processing 状态的条目，
    /// 其它批次认领的行即使在 processing 也绝不会被碰到（并发副本
    /// 各扫各的批次，不可能对同一笔重复调用提供商）。已终态的批次
    /// 重复处理不会触发任何提供商调用（幂等）。条目间用有界并发
    /// 派发，全部落定后对批次做一次且仅一次的汇总
    pub async fn process_batch(&self, batch_id: i64) -> AppResult<BatchResult> {
        batches::Entity::find_by_id(batch_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))?;

        let rows = payouts::Entity::find()
            .filter(payouts::Column::BatchId.eq(batch_id))
            .filter(payouts::Column::Status.eq(PayoutStatus::Processing))
            .all(&self.pool)
            .await?;

        let total = rows.len();

        let results: Vec<PayoutItemResult> = futures_util::stream::iter(rows.into_iter().map(
            |payout| {
                let svc = self.clone();
                async move { svc.process_one(payout).await }
            },
        ))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let successful = results
            .iter()
            .filter(|r| r.status == PayoutStatus::Paid)
            .count();
        let failed = total - successful;

        let batch_status = self.rollup_batch(batch_id, total, successful).await?;

        Ok(BatchResult {
            batch_id,
            batch_status,
            total,
            successful,
            failed,
            results,
        })
    }

    /// 运营操作: 把 failed 打款重置回 pending 以便重新入批
    pub async fn requeue_payout(&self, payout_id: i64) -> AppResult<PayoutResponse> {
        let reset = payouts::Entity::update_many()
            .col_expr(payouts::Column::Status, PayoutStatus::Pending.as_enum())
            .col_expr(payouts::Column::BatchId, Expr::value(Option::<i64>::None))
            .col_expr(
                payouts::Column::FailureReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(payouts::Column::Id.eq(payout_id))
            .filter(payouts::Column::Status.eq(PayoutStatus::Failed))
            .exec(&self.pool)
            .await?;

        if reset.rows_affected == 0 {
            return Err(AppError::StateConflict(format!(
                "payout {payout_id} is not in failed state"
            )));
        }

        let model = payouts::Entity::find_by_id(payout_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payout {payout_id} not found")))?;
        Ok(model.into())
    }

    /// 打款列表（展示面）
    pub async fn list_payouts(
        &self,
        query: &PayoutListQuery,
    ) -> AppResult<PaginatedResponse<PayoutResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = payouts::Entity::find();
        if let Some(user_id) = query.user_id {
            base_query = base_query.filter(payouts::Column::UserId.eq(user_id));
        }
        if let Some(status) = query.status {
            base_query = base_query.filter(payouts::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(payouts::Column::CreatedAt, Order::Desc)
            .order_by(payouts::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<PayoutResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    /// 后台扫描: 认领一页 pending 打款并处理，返回处理条数
    /// 不触碰 failed 条目（重新入批只能由运营操作发起）
    pub async fn sweep_once(&self, page_size: u64) -> AppResult<usize> {
        let pending_ids: Vec<i64> = payouts::Entity::find()
            .filter(payouts::Column::Status.eq(PayoutStatus::Pending))
            .order_by_asc(payouts::Column::CreatedAt)
            .limit(page_size)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if pending_ids.is_empty() {
            return Ok(0);
        }

        let claim = self.claim_payouts_for_batch(&pending_ids).await?;
        // 只处理本次认领到的批次，并发副本抢走的条目归对方的批次处理
        let Some(batch_id) = claim.batch_id else {
            return Ok(0);
        };

        let result = self.process_batch(batch_id).await?;
        Ok(result.total)
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    /// 处理单条打款，错误全部吸收进结果，绝不向批级传播
    async fn process_one(&self, payout: payouts::Model) -> PayoutItemResult {
        let destination = match self.accounts.resolve_destination(payout.user_id).await {
            Ok(d) => d,
            Err(AppError::NotConfigured) => {
                return self
                    .finalize_failure(&payout, NO_ACCOUNT_REASON, false)
                    .await;
            }
            Err(e) => {
                // 目录查询的内部错误按可重试失败记录
                return self
                    .finalize_failure(&payout, &format!("destination lookup failed: {e}"), true)
                    .await;
            }
        };

        let Some(adapter) = self.adapters.get(destination.method) else {
            return self
                .finalize_failure(
                    &payout,
                    &format!("no adapter registered for {}", destination.method),
                    true,
                )
                .await;
        };

        // 超时按传输失败处理，绝不当作成功
        let outcome = match tokio::time::timeout(
            self.send_timeout,
            adapter.send(payout.net_amount_cents, &destination.identifier),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Unavailable("provider call timed out".into())),
        };

        match outcome {
            Ok(external_id) => self.finalize_success(&payout, external_id).await,
            Err(e) => {
                self.finalize_failure(&payout, &e.to_string(), e.retryable())
                    .await
            }
        }
    }

    async fn finalize_success(
        &self,
        payout: &payouts::Model,
        external_id: String,
    ) -> PayoutItemResult {
        let update = payouts::Entity::update_many()
            .col_expr(payouts::Column::Status, PayoutStatus::Paid.as_enum())
            .col_expr(
                payouts::Column::ExternalTransactionId,
                Expr::value(Some(external_id.clone())),
            )
            .col_expr(payouts::Column::PaidAt, Expr::value(Some(Utc::now())))
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(payouts::Column::Id.eq(payout.id))
            .filter(payouts::Column::Status.eq(PayoutStatus::Processing))
            .exec(&self.pool)
            .await;

        match update {
            Ok(r) if r.rows_affected == 0 => {
                log::warn!("payout {} was already terminal when marking paid", payout.id);
            }
            Ok(_) => {}
            Err(e) => {
                // 提供商已扣款但状态写入失败: 保持 processing，重启后的运行会重新认领
                log::error!("failed to persist paid status for payout {}: {e}", payout.id);
            }
        }

        self.notifier
            .notify_payout_result(payout.id, payout.user_id, PayoutStatus::Paid, None)
            .await;

        PayoutItemResult {
            payout_id: payout.id,
            user_id: payout.user_id,
            status: PayoutStatus::Paid,
            external_transaction_id: Some(external_id),
            failure_reason: None,
            retryable: false,
        }
    }

    async fn finalize_failure(
        &self,
        payout: &payouts::Model,
        reason: &str,
        retryable: bool,
    ) -> PayoutItemResult {
        let update = payouts::Entity::update_many()
            .col_expr(payouts::Column::Status, PayoutStatus::Failed.as_enum())
            .col_expr(
                payouts::Column::FailureReason,
                Expr::value(Some(reason.to_string())),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(payouts::Column::Id.eq(payout.id))
            .filter(payouts::Column::Status.eq(PayoutStatus::Processing))
            .exec(&self.pool)
            .await;

        if let Err(e) = update {
            log::error!("failed to persist failed status for payout {}: {e}", payout.id);
        }

        log::warn!("payout {} failed: {reason} (retryable={retryable})", payout.id);

        self.notifier
            .notify_payout_result(payout.id, payout.user_id, PayoutStatus::Failed, Some(reason))
            .await;

        PayoutItemResult {
            payout_id: payout.id,
            user_id: payout.user_id,
            status: PayoutStatus::Failed,
            external_transaction_id: None,
            failure_reason: Some(reason.to_string()),
            retryable,
        }
    }

    /// 批次汇总，processed_at 为空才写入（恰好一次）
    async fn rollup_batch(
        &self,
        batch_id: i64,
        total: usize,
        successful: usize,
    ) -> AppResult<BatchStatus> {
        let status = rollup_status(total, successful);

        let update = batches::Entity::update_many()
            .col_expr(batches::Column::Status, status.as_enum())
            .col_expr(batches::Column::TotalCount, Expr::value(total as i64))
            .col_expr(batches::Column::SuccessCount, Expr::value(successful as i64))
            .col_expr(
                batches::Column::FailureCount,
                Expr::value((total - successful) as i64),
            )
            .col_expr(batches::Column::ProcessedAt, Expr::value(Some(Utc::now())))
            .filter(batches::Column::Id.eq(batch_id))
            .filter(batches::Column::ProcessedAt.is_null())
            .exec(&self.pool)
            .await?;

        if update.rows_affected == 0 {
            // 已汇总过（幂等重放），返回库里已落定的状态
            log::warn!("batch {batch_id} was already rolled up");
            let stored = batches::Entity::find_by_id(batch_id)
                .one(&self.pool)
                .await?
                .map(|b| b.status)
                .unwrap_or(status);
            return Ok(stored);
        }

        log::info!("batch {batch_id} rolled up: {status} ({successful}/{total} paid)");
        Ok(status)
    }
}

/// 批次状态汇总: 全部成功 completed，全部失败 failed，否则 partial
fn rollup_status(total: usize, successful: usize) -> BatchStatus {
    if successful == total {
        BatchStatus::Completed
    } else if successful == 0 {
        BatchStatus::Failed
    } else {
        BatchStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifyConfig;
    use crate::entities::{PayoutMethod, payout_account_entity as accounts};
    use crate::external::PayoutAdapter;
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// 固定成功的适配器
    struct FixedAdapter;

    #[async_trait]
    impl PayoutAdapter for FixedAdapter {
        async fn send(&self, _amount_cents: i64, _dest: &str) -> Result<String, ProviderError> {
            Ok("tx_fixed".to_string())
        }
    }

    /// 永不返回的适配器，用来触发超时路径
    struct StalledAdapter;

    #[async_trait]
    impl PayoutAdapter for StalledAdapter {
        async fn send(&self, _amount_cents: i64, _dest: &str) -> Result<String, ProviderError> {
            futures_util::future::pending().await
        }
    }

    fn service(db: DatabaseConnection, adapter: Arc<dyn PayoutAdapter>) -> PayoutService {
        let mut adapters: HashMap<PayoutMethod, Arc<dyn PayoutAdapter>> = HashMap::new();
        adapters.insert(PayoutMethod::Paypal, adapter);
        PayoutService::new(
            db.clone(),
            PayoutAccountService::new(db),
            AdapterRegistry::new(adapters),
            Notifier::new(NotifyConfig::default()),
            1,
            2,
        )
    }

    fn batch_model(id: i64) -> batches::Model {
        batches::Model {
            id,
            status: BatchStatus::Pending,
            total_count: 1,
            success_count: 0,
            failure_count: 0,
            processed_at: None,
            created_at: None,
        }
    }

    fn payout_model(id: i64, batch_id: i64) -> payouts::Model {
        payouts::Model {
            id,
            user_id: 1,
            contest_id: 1,
            net_amount_cents: 500,
            status: PayoutStatus::Processing,
            batch_id: Some(batch_id),
            external_transaction_id: None,
            failure_reason: None,
            paid_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn account_model() -> accounts::Model {
        accounts::Model {
            id: 1,
            user_id: 1,
            method: PayoutMethod::Paypal,
            identifier: "alice@example.com".to_string(),
            verified: true,
            is_preferred: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// 处理必须按批次过滤: 别的批次认领的 processing 行绝不能被捞进来派发
    #[tokio::test]
    async fn test_process_batch_scopes_to_claimed_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![batch_model(7)]])
            .append_query_results([vec![payout_model(1, 7)]])
            .append_query_results([vec![account_model()]])
            .append_exec_results([
                // 标记 paid
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // 批次汇总
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let svc = service(db.clone(), Arc::new(FixedAdapter));
        let result = svc.process_batch(7).await.unwrap();

        assert_eq!(result.batch_id, 7);
        assert_eq!(result.total, 1);
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 0);
        assert_eq!(result.batch_status, BatchStatus::Completed);
        assert_eq!(
            result.results[0].external_transaction_id.as_deref(),
            Some("tx_fixed")
        );

        let log = db.into_transaction_log();
        // [0] 批次查询, [1] 打款行查询, [2] 账户查询, [3] 终态写入, [4] 汇总
        let payout_select = format!("{:?}", log[1]);
        assert!(
            payout_select.contains(r#""payouts"."batch_id""#),
            "payout query must filter by batch: {payout_select}"
        );
    }

    /// 一条都没认领到时不能留下永远不会被汇总的空批次
    #[tokio::test]
    async fn test_claim_discards_batch_when_nothing_claimed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // INSERT ... RETURNING 回读批次行
            .append_query_results([vec![batch_model(9)]])
            .append_exec_results([
                // 认领 0 行
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                // 删除空批次
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let svc = service(db, Arc::new(FixedAdapter));
        let claim = svc.claim_payouts_for_batch(&[1, 2]).await.unwrap();

        assert_eq!(claim.claimed_count, 0);
        assert!(claim.batch_id.is_none());
    }

    /// 提供商调用超时按传输失败落账: failed 且可重试，绝不当作成功
    #[tokio::test]
    async fn test_timeout_is_recorded_as_retryable_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account_model()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let svc = service(db, Arc::new(StalledAdapter));
        let result = svc.process_one(payout_model(1, 7)).await;

        assert_eq!(result.status, PayoutStatus::Failed);
        assert!(result.retryable);
        assert!(result.failure_reason.unwrap().contains("timed out"));
        assert!(result.external_transaction_id.is_none());
    }

    #[test]
    fn test_rollup_all_succeed() {
        assert_eq!(rollup_status(3, 3), BatchStatus::Completed);
        assert_eq!(rollup_status(1, 1), BatchStatus::Completed);
    }

    #[test]
    fn test_rollup_none_succeed() {
        assert_eq!(rollup_status(3, 0), BatchStatus::Failed);
        assert_eq!(rollup_status(1, 0), BatchStatus::Failed);
    }

    #[test]
    fn test_rollup_partial() {
        // {成功, 失败, 成功} -> partial
        assert_eq!(rollup_status(3, 2), BatchStatus::Partial);
        assert_eq!(rollup_status(3, 1), BatchStatus::Partial);
    }
}
