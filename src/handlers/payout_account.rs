use crate::entities::PayoutMethod;
use crate::models::*;
use crate::services::PayoutAccountService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/payout-accounts/{user_id}",
    tag = "payout_accounts",
    params(
        ("user_id" = i64, Path, description = "用户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户登记的收款账户", body = [PayoutAccountResponse]),
        (status = 401, description = "未授权")
    )
)]
/// 获取用户的收款账户列表
pub async fn list_accounts(
    service: web::Data<PayoutAccountService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_accounts(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payout-accounts/{user_id}",
    tag = "payout_accounts",
    params(
        ("user_id" = i64, Path, description = "用户ID")
    ),
    request_body = RegisterAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登记成功（同通道为覆盖更新）", body = PayoutAccountResponse),
        (status = 400, description = "收款标识格式非法"),
        (status = 401, description = "未授权")
    )
)]
/// 登记/更新收款账户，改动收款标识会重置验证状态
pub async fn register_account(
    service: web::Data<PayoutAccountService>,
    path: web::Path<i64>,
    body: web::Json<RegisterAccountRequest>,
) -> Result<HttpResponse> {
    match service
        .register_account(path.into_inner(), &body.into_inner())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/payout-accounts/{user_id}/{method}",
    tag = "payout_accounts",
    params(
        ("user_id" = i64, Path, description = "用户ID"),
        ("method" = PayoutMethod, Path, description = "支付通道")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "该通道未登记"),
        (status = 401, description = "未授权")
    )
)]
/// 删除某通道的收款账户
pub async fn delete_account(
    service: web::Data<PayoutAccountService>,
    path: web::Path<(i64, PayoutMethod)>,
) -> Result<HttpResponse> {
    let (user_id, method) = path.into_inner();
    match service.delete_account(user_id, method).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payout-accounts/{user_id}/{method}/verify",
    tag = "payout_accounts",
    params(
        ("user_id" = i64, Path, description = "用户ID"),
        ("method" = PayoutMethod, Path, description = "支付通道")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已标记为已验证", body = PayoutAccountResponse),
        (status = 404, description = "该通道未登记"),
        (status = 401, description = "未授权")
    )
)]
/// 运营侧标记收款账户已验证
pub async fn verify_account(
    service: web::Data<PayoutAccountService>,
    path: web::Path<(i64, PayoutMethod)>,
) -> Result<HttpResponse> {
    let (user_id, method) = path.into_inner();
    match service.verify_account(user_id, method).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn payout_account_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payout-accounts")
            .route("/{user_id}", web::get().to(list_accounts))
            .route("/{user_id}", web::post().to(register_account))
            .route("/{user_id}/{method}", web::delete().to(delete_account))
            .route("/{user_id}/{method}/verify", web::post().to(verify_account)),
    );
}
