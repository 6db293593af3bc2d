//! Bearer token 认证
//!
//! `authorize` 是唯一的权限判断入口，extractor 与 `AdminGuard` 中间件都基于它。

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{Method, header::AUTHORIZATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::jwt::get_jwt_service;
use crate::errors::ShepherdError;
use crate::storage::{AccountRole, AccountStatus, SeaOrmStorage};

/// 所需权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
}

/// 从 token 中解析出的调用者身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account_id: String,
    pub email: String,
    pub role: AccountRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

/// 从 Authorization header 提取 Bearer token
fn extract_bearer_token(headers: &actix_web::http::header::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").or_else(|| s.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 校验请求是否具备指定权限
///
/// - 缺少或格式错误的 bearer → Unauthorized
/// - token 无效或过期 → Unauthorized
/// - 需要 Admin 但角色不是 admin → Forbidden
pub fn authorize(
    headers: &actix_web::http::header::HeaderMap,
    capability: Capability,
) -> Result<Caller, ShepherdError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ShepherdError::unauthorized("Missing bearer token"))?;

    let claims = get_jwt_service().validate(token).map_err(|e| {
        debug!("Bearer token validation failed: {}", e);
        ShepherdError::unauthorized("Invalid or expired token")
    })?;

    let caller = Caller {
        account_id: claims.sub,
        email: claims.email,
        role: claims.role,
    };

    if capability == Capability::Admin && !caller.is_admin() {
        debug!("Caller {} lacks admin capability", caller.account_id);
        return Err(ShepherdError::forbidden("Administrator access required"));
    }

    trace!("Authorized {} as {:?}", caller.account_id, capability);
    Ok(caller)
}

/// 以数据库中的账户为准：已停用的账户拒绝，角色按当前值重新判断
///
/// 未注册存储（单元测试）时直接使用 token 中的身份。
async fn confirm_account(
    storage: Option<Arc<SeaOrmStorage>>,
    caller: Caller,
    capability: Capability,
) -> Result<Caller, ShepherdError> {
    let Some(storage) = storage else {
        return Ok(caller);
    };

    let account = storage
        .find_account_by_id(&caller.account_id)
        .await?
        .ok_or_else(|| ShepherdError::unauthorized("Account no longer exists"))?;

    if account.status != AccountStatus::Active {
        debug!("Rejecting token of suspended account {}", account.id);
        return Err(ShepherdError::forbidden("Account is suspended"));
    }

    let caller = Caller {
        role: account.role,
        ..caller
    };
    if capability == Capability::Admin && !caller.is_admin() {
        return Err(ShepherdError::forbidden("Administrator access required"));
    }
    Ok(caller)
}

fn storage_of(req: &HttpRequest) -> Option<Arc<SeaOrmStorage>> {
    req.app_data::<web::Data<Arc<SeaOrmStorage>>>()
        .map(|data| data.get_ref().clone())
}

fn caller_from_request(
    req: &HttpRequest,
    capability: Capability,
) -> LocalBoxFuture<'static, Result<Caller, ShepherdError>> {
    // AdminGuard 已核对过的请求直接复用
    if let Some(caller) = req.extensions().get::<Caller>()
        && (capability == Capability::Authenticated || caller.is_admin())
    {
        let caller = caller.clone();
        return Box::pin(async move { Ok(caller) });
    }

    let claimed = authorize(req.headers(), capability);
    let storage = storage_of(req);
    Box::pin(async move { confirm_account(storage, claimed?, capability).await })
}

impl FromRequest for Caller {
    type Error = ShepherdError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        caller_from_request(req, Capability::Authenticated)
    }
}

/// 必须是管理员
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

impl FromRequest for AdminCaller {
    type Error = ShepherdError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let fut = caller_from_request(req, Capability::Admin);
        Box::pin(async move { fut.await.map(AdminCaller) })
    }
}

/// 可选身份：没有 token、token 无效或账户已停用时为 None
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Caller>);

impl MaybeCaller {
    pub fn account_id(&self) -> Option<&str> {
        self.0.as_ref().map(|c| c.account_id.as_str())
    }
}

impl FromRequest for MaybeCaller {
    type Error = ShepherdError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if extract_bearer_token(req.headers()).is_none() {
            return Box::pin(async { Ok(MaybeCaller(None)) });
        }
        let fut = caller_from_request(req, Capability::Authenticated);
        Box::pin(async move { Ok(MaybeCaller(fut.await.ok())) })
    }
}

/// 管理接口守卫，包裹整个 `/api/admin` scope
#[derive(Clone, Default)]
pub struct AdminGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminGuardMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            // CORS 预检直接放行
            if req.method() == Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            let claimed = authorize(req.headers(), Capability::Admin);
            let storage = req
                .app_data::<web::Data<Arc<SeaOrmStorage>>>()
                .map(|data| data.get_ref().clone());
            let confirmed = match claimed {
                Ok(caller) => confirm_account(storage, caller, Capability::Admin).await,
                Err(e) => Err(e),
            };

            match confirmed {
                Ok(caller) => {
                    req.extensions_mut().insert(caller);
                    let response = srv.call(req).await?.map_into_left_body();
                    Ok(response)
                }
                Err(e) => {
                    let response = actix_web::ResponseError::error_response(&e);
                    Ok(req.into_response(response.map_into_right_body()))
                }
            }
        })
    }
}
