//! 广告端点 `/api/advertisements`

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use futures_util::StreamExt;
use tracing::{error, info};

use crate::api::middleware::Caller;
use crate::services::{AdvertisementService, NewAdvertisement, UploadedImage};

use super::error_code::ErrorCode;
use super::helpers::{api_result, created_response, error_from_shepherd, error_response, success_response};

/// 文本字段上限
const MAX_TEXT_FIELD_SIZE: usize = 16 * 1024;

/// GET /api/advertisements/random
pub async fn random_advertisement(
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    api_result(advertisements.random_active().await)
}

/// GET /api/advertisements
pub async fn list_advertisements(
    caller: Caller,
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    api_result(advertisements.list_for_owner(&caller.account_id).await)
}

/// POST /api/advertisements（multipart：image, title, description, target_url）
pub async fn create_advertisement(
    caller: Caller,
    mut payload: Multipart,
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    let max_size = advertisements.max_size();
    let mut form = NewAdvertisement::default();

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to parse multipart field: {}", e);
                return invalid_multipart(&format!("Invalid multipart data: {}", e));
            }
        };

        let field_name = field.name().unwrap_or("").to_string();
        let limit = if field_name == "image" {
            max_size
        } else {
            MAX_TEXT_FIELD_SIZE
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(bytes) => {
                    if data.len() + bytes.len() > limit {
                        return error_response(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            ErrorCode::FileTooLarge,
                            &format!("Field '{}' exceeds {} bytes", field_name, limit),
                        );
                    }
                    data.extend_from_slice(&bytes);
                }
                Err(e) => {
                    error!("Failed to read multipart chunk: {}", e);
                    return invalid_multipart(&format!("Failed to read upload: {}", e));
                }
            }
        }

        match field_name.as_str() {
            "image" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("")
                    .to_string();
                form.image = Some(UploadedImage {
                    file_name,
                    content_type: field.content_type().map(|m| m.essence_str().to_string()),
                    bytes: data,
                });
            }
            "title" => form.title = String::from_utf8_lossy(&data).into_owned(),
            "description" => form.description = Some(String::from_utf8_lossy(&data).into_owned()),
            "target_url" => form.target_url = Some(String::from_utf8_lossy(&data).into_owned()),
            _ => {
                // 忽略未知字段
            }
        }
    }

    match advertisements.create(&caller.account_id, form).await {
        Ok(ad) => {
            info!("Advertisements API: {} created ad {}", caller.account_id, ad.id);
            created_response(ad)
        }
        Err(e) => error_from_shepherd(&e),
    }
}

/// PATCH /api/advertisements/{id}/toggle
pub async fn toggle_advertisement(
    caller: Caller,
    path: web::Path<String>,
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    api_result(
        advertisements
            .toggle(&caller.account_id, &path.into_inner())
            .await,
    )
}

/// DELETE /api/advertisements/{id}
pub async fn delete_advertisement(
    caller: Caller,
    path: web::Path<String>,
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    match advertisements
        .delete(&caller.account_id, &path.into_inner())
        .await
    {
        Ok(()) => success_response(()),
        Err(e) => error_from_shepherd(&e),
    }
}

fn invalid_multipart(message: &str) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidMultipartData, message)
}

pub fn advertisements_routes() -> actix_web::Scope {
    web::scope("/advertisements")
        .route("", web::get().to(list_advertisements))
        .route("", web::post().to(create_advertisement))
        .route("/random", web::get().to(random_advertisement))
        .route("/{id}/toggle", web::patch().to(toggle_advertisement))
        .route("/{id}", web::delete().to(delete_advertisement))
}
