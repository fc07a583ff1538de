use crate::entities::{PayoutMethod, payout_account_entity as accounts};
use crate::error::{AppError, AppResult};
use crate::models::{PayoutAccountResponse, RegisterAccountRequest, ResolvedDestination};
use chrono::Utc;
use regex::Regex;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::OnceLock;

/// 收款账户目录
///
/// 打款处理器只通过 resolve_destination 消费这里的状态；
/// 登记/删除属于用户侧账户管理
#[derive(Clone)]
pub struct PayoutAccountService {
    pool: DatabaseConnection,
}

impl PayoutAccountService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 登记或覆盖某通道的收款账户
    /// 改动收款标识会重置 verified，设为首选会清掉该用户其它通道的首选位
    pub async fn register_account(
        &self,
        user_id: i64,
        request: &RegisterAccountRequest,
    ) -> AppResult<PayoutAccountResponse> {
        validate_identifier(request.method, &request.identifier)?;

        let txn = self.pool.begin().await?;

        if request.preferred {
            accounts::Entity::update_many()
                .col_expr(accounts::Column::IsPreferred, Expr::value(false))
                .filter(accounts::Column::UserId.eq(user_id))
                .filter(accounts::Column::Method.ne(request.method))
                .exec(&txn)
                .await?;
        }

        let existing = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Method.eq(request.method))
            .one(&txn)
            .await?;

        let model = match existing {
            Some(m) => {
                let identifier_changed = m.identifier != request.identifier;
                let mut am = m.into_active_model();
                am.identifier = Set(request.identifier.clone());
                if identifier_changed {
                    am.verified = Set(false);
                }
                am.is_preferred = Set(request.preferred);
                am.updated_at = Set(Some(Utc::now()));
                am.update(&txn).await?
            }
            None => {
                accounts::ActiveModel {
                    user_id: Set(user_id),
                    method: Set(request.method),
                    identifier: Set(request.identifier.clone()),
                    verified: Set(false),
                    is_preferred: Set(request.preferred),
                    created_at: Set(Some(Utc::now())),
                    updated_at: Set(Some(Utc::now())),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;
        Ok(model.into())
    }

    pub async fn list_accounts(&self, user_id: i64) -> AppResult<Vec<PayoutAccountResponse>> {
        let list = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Method)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn delete_account(&self, user_id: i64, method: PayoutMethod) -> AppResult<()> {
        let result = accounts::Entity::delete_many()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Method.eq(method))
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "No {method} account for user {user_id}"
            )));
        }
        Ok(())
    }

    /// 运营侧标记账户已验证
    pub async fn verify_account(
        &self,
        user_id: i64,
        method: PayoutMethod,
    ) -> AppResult<PayoutAccountResponse> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Method.eq(method))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No {method} account for user {user_id}"))
            })?;

        let mut am = account.into_active_model();
        am.verified = Set(true);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// 解析用户实际应走的打款目的地
    ///
    /// 首选通道已验证则用首选；首选缺失或未验证时回退到
    /// 其它已验证通道（固定顺序 chime -> paypal -> stripe）；
    /// 没有任何已验证账户返回 NotConfigured
    pub async fn resolve_destination(&self, user_id: i64) -> AppResult<ResolvedDestination> {
        let list = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await?;

        choose_destination(&list).ok_or(AppError::NotConfigured)
    }
}

/// 回退顺序（固定，保证可预测的路由）
const FALLBACK_ORDER: [PayoutMethod; 3] =
    [PayoutMethod::Chime, PayoutMethod::Paypal, PayoutMethod::Stripe];

fn choose_destination(list: &[accounts::Model]) -> Option<ResolvedDestination> {
    if let Some(preferred) = list.iter().find(|a| a.is_preferred && a.verified) {
        return Some(ResolvedDestination {
            method: preferred.method,
            identifier: preferred.identifier.clone(),
        });
    }

    for method in FALLBACK_ORDER {
        if let Some(account) = list.iter().find(|a| a.method == method && a.verified) {
            return Some(ResolvedDestination {
                method: account.method,
                identifier: account.identifier.clone(),
            });
        }
    }

    None
}

fn validate_identifier(method: PayoutMethod, identifier: &str) -> AppResult<()> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    static STRIPE_RE: OnceLock<Regex> = OnceLock::new();
    static CHIME_RE: OnceLock<Regex> = OnceLock::new();

    let ok = match method {
        PayoutMethod::Paypal => EMAIL_RE
            .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
            .is_match(identifier),
        PayoutMethod::Stripe => STRIPE_RE
            .get_or_init(|| Regex::new(r"^acct_[A-Za-z0-9]{8,}$").unwrap())
            .is_match(identifier),
        PayoutMethod::Chime => CHIME_RE
            .get_or_init(|| Regex::new(r"^\$?[A-Za-z][A-Za-z0-9_-]{1,63}$").unwrap())
            .is_match(identifier),
    };

    if ok {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "invalid {method} identifier"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(
        method: PayoutMethod,
        identifier: &str,
        verified: bool,
        is_preferred: bool,
    ) -> accounts::Model {
        accounts::Model {
            id: 0,
            user_id: 1,
            method,
            identifier: identifier.to_string(),
            verified,
            is_preferred,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_resolve_prefers_verified_preferred() {
        let list = vec![
            account(PayoutMethod::Chime, "$alice", true, false),
            account(PayoutMethod::Paypal, "alice@example.com", true, true),
        ];
        let dest = choose_destination(&list).unwrap();
        assert_eq!(dest.method, PayoutMethod::Paypal);
    }

    #[test]
    fn test_resolve_falls_back_when_preferred_unverified() {
        let list = vec![
            account(PayoutMethod::Paypal, "alice@example.com", false, true),
            account(PayoutMethod::Stripe, "acct_1A2B3C4D5E", true, false),
        ];
        let dest = choose_destination(&list).unwrap();
        assert_eq!(dest.method, PayoutMethod::Stripe);
    }

    #[test]
    fn test_resolve_fallback_order_is_stable() {
        let list = vec![
            account(PayoutMethod::Stripe, "acct_1A2B3C4D5E", true, false),
            account(PayoutMethod::Chime, "$alice", true, false),
        ];
        let dest = choose_destination(&list).unwrap();
        assert_eq!(dest.method, PayoutMethod::Chime);
    }

    #[test]
    fn test_resolve_none_when_nothing_verified() {
        let list = vec![
            account(PayoutMethod::Paypal, "alice@example.com", false, true),
            account(PayoutMethod::Chime, "$alice", false, false),
        ];
        assert!(choose_destination(&list).is_none());
        assert!(choose_destination(&[]).is_none());
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier(PayoutMethod::Paypal, "a@b.io").is_ok());
        assert!(validate_identifier(PayoutMethod::Paypal, "not-an-email").is_err());
        assert!(validate_identifier(PayoutMethod::Stripe, "acct_1A2B3C4D5E").is_ok());
        assert!(validate_identifier(PayoutMethod::Stripe, "cus_123").is_err());
        assert!(validate_identifier(PayoutMethod::Chime, "$alice-pay").is_ok());
        assert!(validate_identifier(PayoutMethod::Chime, "$").is_err());
    }
}
