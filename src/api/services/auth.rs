//! 账户认证端点 `/api/auth`

use std::sync::Arc;

use actix_web::{HttpRequest, Responder, web};
use tracing::{info, trace};

use crate::api::middleware::Caller;
use crate::services::{AccountService, SignInRequest, SignUpRequest};

use super::helpers::{api_result, client_ip, created_response, error_from_shepherd};
use super::types::{GoogleSignInBody, SignInBody, SignUpBody};

/// POST /api/auth/signup
pub async fn sign_up(
    req: HttpRequest,
    body: web::Json<SignUpBody>,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    let body = body.into_inner();
    trace!("Auth API: sign-up request for {}", body.email);

    let ip = client_ip(&req);
    let request = SignUpRequest {
        email: body.email,
        password: body.password,
        full_name: body.full_name,
        recaptcha_token: body.recaptcha_token,
    };

    match accounts.sign_up(request, ip.as_deref()).await {
        Ok(session) => {
            info!("Auth API: account {} signed up", session.user.id);
            created_response(session)
        }
        Err(e) => error_from_shepherd(&e),
    }
}

/// POST /api/auth/token
pub async fn sign_in(
    req: HttpRequest,
    body: web::Json<SignInBody>,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    let body = body.into_inner();
    let ip = client_ip(&req);
    let request = SignInRequest {
        email: body.email,
        password: body.password,
        recaptcha_token: body.recaptcha_token,
    };
    api_result(accounts.sign_in(request, ip.as_deref()).await)
}

/// POST /api/auth/google
pub async fn sign_in_google(
    body: web::Json<GoogleSignInBody>,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    api_result(accounts.sign_in_with_google(&body.access_token).await)
}

/// GET /api/auth/user
pub async fn current_user(
    caller: Caller,
    accounts: web::Data<Arc<AccountService>>,
) -> impl Responder {
    api_result(accounts.me(&caller.account_id).await)
}

pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/signup", web::post().to(sign_up))
        .route("/token", web::post().to(sign_in))
        .route("/google", web::post().to(sign_in_google))
        .route("/user", web::get().to(current_user))
}
