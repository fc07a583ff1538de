use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{BatchStatus, EntryReason, PayoutMethod, PayoutStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::entry::grant_entries,
        handlers::entry::grant_multiple,
        handlers::entry::get_history,
        handlers::entry::get_balance,
        handlers::draw::create_draw,
        handlers::draw::list_draws,
        handlers::draw::get_active_draw,
        handlers::draw::execute_draw,
        handlers::payout_account::list_accounts,
        handlers::payout_account::register_account,
        handlers::payout_account::delete_account,
        handlers::payout_account::verify_account,
        handlers::payout::create_payouts,
        handlers::payout::list_payouts,
        handlers::payout::claim_batch,
        handlers::payout::process_batch,
        handlers::payout::requeue_payout,
    ),
    components(
        schemas(
            EntryReason,
            PayoutMethod,
            PayoutStatus,
            BatchStatus,
            GrantEntriesRequest,
            GrantEntriesResponse,
            GrantMultipleRequest,
            GrantMultipleResponse,
            GrantItemResult,
            EntryGrantResponse,
            EntryBalanceResponse,
            CreateDrawRequest,
            JackpotDrawResponse,
            ExecuteDrawResponse,
            RegisterAccountRequest,
            PayoutAccountResponse,
            CreatePayoutsRequest,
            CreatePayoutItem,
            PayoutResponse,
            ClaimBatchRequest,
            ClaimBatchResponse,
            ProcessBatchRequest,
            PayoutItemResult,
            BatchResult,
            PaginationInfo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "entries", description = "抽奖资格账本"),
        (name = "draws", description = "抽奖期与开奖"),
        (name = "payout_accounts", description = "收款账户目录"),
        (name = "payouts", description = "打款与批处理")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
