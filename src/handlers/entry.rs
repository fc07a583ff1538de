use crate::models::*;
use crate::services::EntryService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/entries/grant",
    tag = "entries",
    request_body = GrantEntriesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发放成功，返回记录ID与最新总数", body = GrantEntriesResponse),
        (status = 400, description = "参数校验失败（原因码/数量/ID非法）"),
        (status = 401, description = "未授权")
    )
)]
/// 发放抽奖资格: 写入一条不可变的发放记录并原子更新用户余额
pub async fn grant_entries(
    service: web::Data<EntryService>,
    body: web::Json<GrantEntriesRequest>,
) -> Result<HttpResponse> {
    match service.grant_entries(&body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/entries/grant-multiple",
    tag = "entries",
    request_body = GrantMultipleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "逐条结果列表（单条失败不影响其它条目）", body = GrantMultipleResponse),
        (status = 401, description = "未授权")
    )
)]
/// 批量发放抽奖资格，逐条独立生效
pub async fn grant_multiple(
    service: web::Data<EntryService>,
    body: web::Json<GrantMultipleRequest>,
) -> Result<HttpResponse> {
    match service.grant_multiple(&body.grants).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/entries/{user_id}/history",
    tag = "entries",
    params(
        ("user_id" = i64, Path, description = "用户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发放历史（倒序）", body = PaginatedResponse<EntryGrantResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取用户的资格发放历史
pub async fn get_history(
    service: web::Data<EntryService>,
    path: web::Path<i64>,
    query: web::Query<EntryHistoryQuery>,
) -> Result<HttpResponse> {
    match service
        .get_entry_history(path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/entries/{user_id}/balance",
    tag = "entries",
    params(
        ("user_id" = i64, Path, description = "用户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前资格余额", body = EntryBalanceResponse),
        (status = 401, description = "未授权")
    )
)]
/// 获取用户当前资格余额（无记录返回0）
pub async fn get_balance(
    service: web::Data<EntryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_balance(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn entry_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/entries")
            .route("/grant", web::post().to(grant_entries))
            .route("/grant-multiple", web::post().to(grant_multiple))
            .route("/{user_id}/history", web::get().to(get_history))
            .route("/{user_id}/balance", web::get().to(get_balance)),
    );
}
