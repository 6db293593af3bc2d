//! Service layer for business logic
//!
//! Shared between the HTTP API and the CLI. Services own validation and
//! ownership rules; storage stays a thin persistence layer.

mod account_service;
mod advertisement_service;
pub mod code_registry;
mod dispatcher;
pub mod identity;
mod link_service;
mod report_service;
mod session_service;
mod settings_service;

pub use account_service::*;
pub use advertisement_service::*;
pub use code_registry::{AllocatedCode, CodeIndex, CodePolicy, CodeRegistry};
pub use dispatcher::*;
pub use identity::{CaptchaVerifier, GoogleIdentity, GoogleProfile, IdentityProvider, Recaptcha};
pub use link_service::*;
pub use report_service::*;
pub use session_service::*;
pub use settings_service::*;

use std::sync::Arc;

use crate::api::jwt::get_jwt_service;
use crate::storage::SeaOrmStorage;

/// 所有服务的集合，HTTP 层与 CLI 共用
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub links: Arc<LinkService>,
    pub dispatcher: Arc<RedirectDispatcher>,
    pub accounts: Arc<AccountService>,
    pub advertisements: Arc<AdvertisementService>,
    pub reports: Arc<ReportService>,
    pub sessions: Arc<SessionService>,
    pub settings: Arc<SettingsService>,
}

impl AppServices {
    /// 使用配置中的 Google / reCAPTCHA 设置
    pub fn from_storage(storage: Arc<SeaOrmStorage>) -> Self {
        Self::with_providers(
            storage,
            Arc::new(GoogleIdentity::from_config()),
            Arc::new(Recaptcha::from_config()),
        )
    }

    pub fn with_providers(
        storage: Arc<SeaOrmStorage>,
        identity: Arc<dyn IdentityProvider>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Self {
        let index: Arc<dyn CodeIndex> = storage.clone();
        let registry = Arc::new(CodeRegistry::new(index, CodePolicy::from_config()));

        Self {
            links: Arc::new(LinkService::new(storage.clone(), registry)),
            dispatcher: Arc::new(RedirectDispatcher::new(storage.clone())),
            accounts: Arc::new(AccountService::new(
                storage.clone(),
                get_jwt_service(),
                identity,
                captcha,
            )),
            advertisements: Arc::new(AdvertisementService::new(storage.clone())),
            reports: Arc::new(ReportService::new(storage.clone())),
            sessions: Arc::new(SessionService::new(storage.clone())),
            settings: Arc::new(SettingsService::new(storage.clone())),
            storage,
        }
    }
}
