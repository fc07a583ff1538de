use crate::entities::PayoutStatus;
use crate::models::*;
use crate::services::PayoutService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payouts",
    tag = "payouts",
    request_body = CreatePayoutsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "入账成功，返回创建的 pending 打款", body = [PayoutResponse]),
        (status = 400, description = "金额或ID非法"),
        (status = 401, description = "未授权")
    )
)]
/// 赛事结算入账: 批量创建待打款记录
pub async fn create_payouts(
    service: web::Data<PayoutService>,
    body: web::Json<CreatePayoutsRequest>,
) -> Result<HttpResponse> {
    match service.create_payouts(&body.payouts).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payouts",
    tag = "payouts",
    params(
        ("user_id" = Option<i64>, Query, description = "按用户过滤"),
        ("status" = Option<PayoutStatus>, Query, description = "按状态过滤"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "打款列表（倒序）", body = PaginatedResponse<PayoutResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取打款记录
pub async fn list_payouts(
    service: web::Data<PayoutService>,
    query: web::Query<PayoutListQuery>,
) -> Result<HttpResponse> {
    match service.list_payouts(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payouts/claim",
    tag = "payouts",
    request_body = ClaimBatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "认领结果（已被抢走或已终态的条目不计入；一条都没认领到时批次被丢弃，batch_id 为 null）", body = ClaimBatchResponse),
        (status = 400, description = "ID列表为空"),
        (status = 401, description = "未授权")
    )
)]
/// 把 pending 打款认领进一个新批次（并发安全的条件更新）
pub async fn claim_batch(
    service: web::Data<PayoutService>,
    body: web::Json<ClaimBatchRequest>,
) -> Result<HttpResponse> {
    match service.claim_payouts_for_batch(&body.payout_ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payouts/process",
    tag = "payouts",
    request_body = ProcessBatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "逐条结果与批次汇总状态，调用方必须检查 results", body = BatchResult),
        (status = 404, description = "批次不存在"),
        (status = 401, description = "未授权")
    )
)]
/// 处理批次: 只派发该批次认领到的条目，重复处理已汇总的批次不会重复打款
pub async fn process_batch(
    service: web::Data<PayoutService>,
    body: web::Json<ProcessBatchRequest>,
) -> Result<HttpResponse> {
    match service.process_batch(body.batch_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payouts/{payout_id}/requeue",
    tag = "payouts",
    params(
        ("payout_id" = i64, Path, description = "打款ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已重置回 pending", body = PayoutResponse),
        (status = 409, description = "该打款不处于 failed 状态"),
        (status = 401, description = "未授权")
    )
)]
/// 运营操作: 把 failed 打款重置回 pending 以便重新入批
pub async fn requeue_payout(
    service: web::Data<PayoutService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.requeue_payout(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn payout_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payouts")
            .route("", web::post().to(create_payouts))
            .route("", web::get().to(list_payouts))
            .route("/claim", web::post().to(claim_batch))
            .route("/process", web::post().to(process_batch))
            .route("/{payout_id}/requeue", web::post().to(requeue_payout)),
    );
}
