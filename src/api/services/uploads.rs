//! 上传文件访问 `/uploads/{file}`

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{error, trace};

use crate::services::AdvertisementService;

/// 只允许单层文件名，拒绝路径穿越
fn sanitize_file_name(name: &str) -> Option<&str> {
    let valid = !name.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then_some(name)
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// GET /uploads/{file}
pub async fn serve_upload(
    path: web::Path<String>,
    advertisements: web::Data<Arc<AdvertisementService>>,
) -> impl Responder {
    let requested = path.into_inner();
    let Some(file_name) = sanitize_file_name(&requested) else {
        trace!("Rejected upload path: {}", requested);
        return HttpResponse::NotFound().finish();
    };

    let full_path = advertisements.upload_dir().join(file_name);
    match tokio::fs::read(&full_path).await {
        Ok(bytes) => HttpResponse::Ok()
            .insert_header(("Content-Type", content_type_for(file_name)))
            .insert_header(("Cache-Control", "public, max-age=86400"))
            .body(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().finish(),
        Err(e) => {
            error!("Failed to read upload {}: {}", full_path.display(), e);
            HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).finish()
        }
    }
}

pub fn uploads_routes() -> actix_web::Scope {
    web::scope("/uploads").route("/{file}", web::get().to(serve_upload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("1700-abc.png"), Some("1700-abc.png"));
        assert_eq!(sanitize_file_name("../etc/passwd"), None);
        assert_eq!(sanitize_file_name(".hidden"), None);
        assert_eq!(sanitize_file_name("a/b.png"), None);
        assert_eq!(sanitize_file_name(""), None);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("x.PNG"), "image/png");
        assert_eq!(content_type_for("x.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("x.bin"), "application/octet-stream");
    }
}
