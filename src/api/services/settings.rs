use std::sync::Arc;

use actix_web::{Responder, web};

use crate::services::SettingsService;

use super::helpers::api_result;

/// GET /api/settings
pub async fn get_settings(settings: web::Data<Arc<SettingsService>>) -> impl Responder {
    api_result(settings.get().await)
}

pub fn settings_routes() -> actix_web::Scope {
    web::scope("/settings").route("", web::get().to(get_settings))
}
