//! 链接端点 `/api/links`

use std::sync::Arc;

use actix_web::{Responder, web};
use tracing::{info, trace};

use crate::api::middleware::Caller;
use crate::services::{CreateLinkRequest, LinkService, UpdateLinkRequest};

use super::helpers::{api_result, created_response, error_from_shepherd, success_response};
use super::types::{CreateLinkBody, GeneratedCode, UpdateLinkBody};

/// GET /api/links/generate-code
pub async fn generate_code(links: web::Data<Arc<LinkService>>) -> impl Responder {
    api_result(
        links
            .preview_code()
            .await
            .map(|code| GeneratedCode { code }),
    )
}

/// POST /api/links
pub async fn create_link(
    caller: Caller,
    body: web::Json<CreateLinkBody>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let body = body.into_inner();
    let request = CreateLinkRequest {
        destination: body.destination,
        title: body.title,
        code: body.code,
        mode: body.mode,
    };

    match links.create(Some(&caller.account_id), request).await {
        Ok(result) => {
            info!(
                "Links API: {} created '{}' (generated={})",
                caller.account_id, result.link.code, result.generated_code
            );
            created_response(result.link)
        }
        Err(e) => error_from_shepherd(&e),
    }
}

/// GET /api/links
pub async fn list_links(caller: Caller, links: web::Data<Arc<LinkService>>) -> impl Responder {
    trace!("Links API: listing links for {}", caller.account_id);
    api_result(links.list_for_owner(&caller.account_id).await)
}

/// GET /api/links/{code}
pub async fn get_link(path: web::Path<String>, links: web::Data<Arc<LinkService>>) -> impl Responder {
    api_result(links.get_by_code(&path.into_inner()).await)
}

/// POST /api/links/{id}/click
pub async fn record_click(
    path: web::Path<String>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    match links.increment_click(&path.into_inner()).await {
        Ok(()) => success_response(()),
        Err(e) => error_from_shepherd(&e),
    }
}

/// PATCH /api/links/{id}
pub async fn update_link(
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<UpdateLinkBody>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let body = body.into_inner();
    let request = UpdateLinkRequest {
        destination: body.destination,
        title: body.title,
        mode: body.mode,
        state: body.state,
    };
    api_result(
        links
            .update(&caller.account_id, &path.into_inner(), request)
            .await,
    )
}

/// DELETE /api/links/{id}
pub async fn delete_link(
    caller: Caller,
    path: web::Path<String>,
    links: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let id = path.into_inner();
    match links.remove(&caller.account_id, &id).await {
        Ok(()) => {
            info!("Links API: {} removed link {}", caller.account_id, id);
            success_response(())
        }
        Err(e) => error_from_shepherd(&e),
    }
}

/// `/links` 路由，`generate-code` 必须在 `/{code}` 之前
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(list_links))
        .route("", web::post().to(create_link))
        .route("/generate-code", web::get().to(generate_code))
        .route("/{id}/click", web::post().to(record_click))
        .route("/{code}", web::get().to(get_link))
        .route("/{id}", web::patch().to(update_link))
        .route("/{id}", web::delete().to(delete_link))
}
