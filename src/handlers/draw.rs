use crate::models::*;
use crate::services::{DrawService, EntryService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/draws",
    tag = "draws",
    request_body = CreateDrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = JackpotDrawResponse),
        (status = 400, description = "窗口或金额非法"),
        (status = 401, description = "未授权")
    )
)]
/// 创建抽奖期（管理侧）
pub async fn create_draw(
    service: web::Data<DrawService>,
    body: web::Json<CreateDrawRequest>,
) -> Result<HttpResponse> {
    match service.create_draw(&body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws",
    tag = "draws",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖期列表（按窗口倒序）", body = PaginatedResponse<JackpotDrawResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取抽奖期列表
pub async fn list_draws(
    service: web::Data<DrawService>,
    query: web::Query<DrawListQuery>,
) -> Result<HttpResponse> {
    match service.list_draws(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws/active",
    tag = "draws",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前进行中的抽奖期，没有则 data 为 null", body = JackpotDrawResponse),
        (status = 401, description = "未授权")
    )
)]
/// 获取当前进行中的抽奖期
pub async fn get_active_draw(service: web::Data<EntryService>) -> Result<HttpResponse> {
    match service.get_active_draw().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draws/{draw_id}/execute",
    tag = "draws",
    params(
        ("draw_id" = i64, Path, description = "抽奖期ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开奖成功", body = ExecuteDrawResponse),
        (status = 404, description = "抽奖期不存在"),
        (status = 409, description = "已开出 / 窗口未关闭 / 无合格参与者"),
        (status = 401, description = "未授权")
    )
)]
/// 开奖:
/// 1. 校验窗口已关闭且尚未开出
/// 2. 按窗口内发放记录加权随机选出中签者
/// 3. 条件更新写入，并发重复调用只会有一个成功
pub async fn execute_draw(
    service: web::Data<DrawService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.execute_draw(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draws")
            .route("", web::post().to(create_draw))
            .route("", web::get().to(list_draws))
            .route("/active", web::get().to(get_active_draw))
            .route("/{draw_id}/execute", web::post().to(execute_draw)),
    );
}
