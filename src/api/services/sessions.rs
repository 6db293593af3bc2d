use std::sync::Arc;

use actix_web::{HttpRequest, Responder, web};

use crate::api::middleware::MaybeCaller;
use crate::services::SessionService;
use crate::storage::SessionTouch;

use super::helpers::{client_ip, error_from_shepherd, success_response};
use super::types::TrackSessionBody;

/// POST /api/sessions/track
pub async fn track_session(
    req: HttpRequest,
    caller: MaybeCaller,
    body: web::Json<TrackSessionBody>,
    sessions: web::Data<Arc<SessionService>>,
) -> impl Responder {
    let body = body.into_inner();

    // 未显式传 UA 时取请求头
    let user_agent = body.user_agent.or_else(|| {
        req.headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    });

    // body 未带 user_id 时取已登录调用者
    let user_id = body
        .user_id
        .or_else(|| caller.account_id().map(str::to_string));

    let touch = SessionTouch {
        user_id,
        user_agent,
        browser_info: body.browser_info,
        cookies_data: body.cookies_data,
        referrer: body.referrer,
        device_type: body.device_type,
        screen_resolution: body.screen_resolution,
        ip_address: client_ip(&req),
    };

    match sessions.track(&body.session_id, touch).await {
        Ok(()) => success_response(()),
        Err(e) => error_from_shepherd(&e),
    }
}

pub fn sessions_routes() -> actix_web::Scope {
    web::scope("/sessions").route("/track", web::post().to(track_session))
}
