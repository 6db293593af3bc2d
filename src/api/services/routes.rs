//! 路由装配
//!
//! 服务端与集成测试共用同一份路由表。

use actix_web::web;

use crate::errors::ShepherdError;
use crate::services::AppServices;

use super::admin::admin_routes;
use super::advertisements::advertisements_routes;
use super::auth::auth_routes;
use super::health::{AppStartTime, health_routes};
use super::links::links_routes;
use super::redirect::{redirect_routes, resolve_json};
use super::reports::reports_routes;
use super::sessions::sessions_routes;
use super::settings::settings_routes;
use super::uploads::uploads_routes;

/// JSON body 上限
const JSON_LIMIT: usize = 256 * 1024;

/// `/api` 下的全部路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .service(auth_routes())
        .service(links_routes())
        .route("/redirect/{code}", web::get().to(resolve_json))
        .service(advertisements_routes())
        .service(reports_routes())
        .service(sessions_routes())
        .service(settings_routes())
        .service(admin_routes())
}

/// 注册共享状态与全部路由，`/{code}` 兜底放在最后
pub fn configure(cfg: &mut web::ServiceConfig, services: &AppServices, started: &AppStartTime) {
    cfg.app_data(web::Data::new(services.storage.clone()))
        .app_data(web::Data::new(services.links.clone()))
        .app_data(web::Data::new(services.dispatcher.clone()))
        .app_data(web::Data::new(services.accounts.clone()))
        .app_data(web::Data::new(services.advertisements.clone()))
        .app_data(web::Data::new(services.reports.clone()))
        .app_data(web::Data::new(services.sessions.clone()))
        .app_data(web::Data::new(services.settings.clone()))
        .app_data(web::Data::new(started.clone()))
        .app_data(web::JsonConfig::default().limit(JSON_LIMIT).error_handler(
            |err, _req| ShepherdError::validation(format!("Invalid JSON body: {}", err)).into(),
        ))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            ShepherdError::validation(format!("Invalid query string: {}", err)).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            ShepherdError::validation(format!("Invalid path parameter: {}", err)).into()
        }))
        .service(health_routes())
        .service(uploads_routes())
        .service(api_routes())
        .service(redirect_routes());
}
