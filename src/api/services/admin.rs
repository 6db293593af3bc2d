//! 管理端点 `/api/admin`
//!
//! 整个 scope 由 `AdminGuard` 包裹，handler 内通过 `AdminCaller` 取身份。

use std::sync::Arc;

use actix_web::{Responder, web};
use tracing::info;

use crate::api::middleware::{AdminCaller, AdminGuard};
use crate::services::{
    AccountService, AccountUpdate, LinkService, ReportService, ReportUpdate, SessionService,
    SettingsService, SettingsUpdate,
};

use super::helpers::api_result;
use super::types::{
    AdminLinksQuery, LinkStateBody, UpdateAccountBody, UpdateReportBody, UpdateSettingsBody,
};

// ============ Users ============

pub async fn list_users(
    _admin: AdminCaller,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    api_result(accounts.list_accounts().await)
}

pub async fn update_user(
    AdminCaller(admin): AdminCaller,
    path: web::Path<String>,
    body: web::Json<UpdateAccountBody>,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    let id = path.into_inner();
    let body = body.into_inner();
    info!(
        "Admin API: {} updating account {} (role={:?}, status={:?})",
        admin.account_id, id, body.role, body.status
    );
    api_result(
        accounts
            .update_account(
                &id,
                AccountUpdate {
                    role: body.role,
                    status: body.status,
                },
            )
            .await,
    )
}

// ============ Reports ============

pub async fn list_reports(
    _admin: AdminCaller,
    reports: web::Data<Arc<ReportService>>,
) -> impl Responder {
    api_result(reports.list().await)
}

pub async fn update_report(
    _admin: AdminCaller,
    path: web::Path<String>,
    body: web::Json<UpdateReportBody>,
    reports: web::Data<Arc<ReportService>>,
) -> impl Responder {
    let body = body.into_inner();
    api_result(
        reports
            .update(
                &path.into_inner(),
                ReportUpdate {
                    status: body.status,
                    admin_response: body.admin_response,
                },
            )
            .await,
    )
}

// ============ Sessions ============

pub async fn list_sessions(
    _admin: AdminCaller,
    sessions: web::Data<Arc<SessionService>>,
) -> impl Responder {
    api_result(sessions.recent().await)
}

pub async fn list_user_sessions(
    _admin: AdminCaller,
    path: web::Path<String>,
    sessions: web::Data<Arc<SessionService>>,
) -> impl Responder {
    api_result(sessions.for_user(&path.into_inner()).await)
}

// ============ Settings ============

pub async fn update_settings(
    AdminCaller(admin): AdminCaller,
    body: web::Json<UpdateSettingsBody>,
    settings: web::Data<Arc<SettingsService>>,
) -> impl Responder {
    let body = body.into_inner();
    info!("Admin API: {} updating site settings", admin.account_id);
    api_result(
        settings
            .update(SettingsUpdate {
                adsense_client_id: body.adsense_client_id,
                adsense_timer_slot: body.adsense_timer_slot,
                adsense_ad_slot: body.adsense_ad_slot,
                adsense_enabled: body.adsense_enabled,
            })
            .await,
    )
}

// ============ Links ============

pub async fn list_links(
    _admin: AdminCaller,
    query: web::Query<AdminLinksQuery>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    api_result(links.list_all(query.into_inner().state).await)
}

pub async fn set_link_state(
    AdminCaller(admin): AdminCaller,
    path: web::Path<String>,
    body: web::Json<LinkStateBody>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let id = path.into_inner();
    info!(
        "Admin API: {} setting link {} to {}",
        admin.account_id, id, body.state
    );
    api_result(links.set_state(&id, body.state).await)
}

pub async fn get_stats(
    _admin: AdminCaller,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    api_result(links.stats().await)
}

/// Admin 路由，统一由 `AdminGuard` 校验
pub fn admin_routes() -> impl actix_web::dev::HttpServiceFactory {
    web::scope("/admin")
        .wrap(AdminGuard)
        .route("/users", web::get().to(list_users))
        .route("/users/{id}", web::patch().to(update_user))
        .route("/reports", web::get().to(list_reports))
        .route("/reports/{id}", web::patch().to(update_report))
        .route("/sessions", web::get().to(list_sessions))
        .route("/sessions/user/{id}", web::get().to(list_user_sessions))
        .route("/settings", web::put().to(update_settings))
        .route("/links", web::get().to(list_links))
        .route("/links/{id}/status", web::patch().to(set_link_state))
        .route("/stats", web::get().to(get_stats))
}
