//! 跳转端点
//!
//! `/api/redirect/{code}` 返回 JSON 跳转指令；`/{code}` 面向浏览器，直接渲染
//! 307 或中间页。

use std::sync::Arc;

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::config::get_config;
use crate::errors::ShepherdError;
use crate::services::{Dispatch, RedirectAction, RedirectDispatcher};
use crate::storage::Advertisement;
use crate::utils::{escape_html, is_valid_short_code};

use super::helpers::{api_result, error_from_shepherd};

/// GET /api/redirect/{code}
pub async fn resolve_json(
    path: web::Path<String>,
    dispatcher: web::Data<Arc<RedirectDispatcher>>,
) -> impl Responder {
    api_result(dispatcher.resolve(&path.into_inner()).await)
}

pub struct RedirectService;

impl RedirectService {
    /// GET /{code}，HEAD 不计点击
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        dispatcher: web::Data<Arc<RedirectDispatcher>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if code.is_empty() {
            return HttpResponse::TemporaryRedirect()
                .insert_header(("Location", get_config().server.default_url.as_str()))
                .finish();
        }
        if !is_valid_short_code(&code) {
            // 非法短码不查库
            trace!("Invalid short code rejected: {}", code);
            return Self::not_found_page();
        }

        let resolved = if req.method() == Method::HEAD {
            dispatcher.peek(&code).await
        } else {
            dispatcher.resolve(&code).await
        };

        match resolved {
            Ok(dispatch) => Self::render(&dispatch),
            Err(ShepherdError::NotFound(_)) => Self::not_found_page(),
            Err(ShepherdError::Unavailable(_)) => {
                debug!("Redirect to unavailable link: {}", code);
                Self::unavailable_page()
            }
            Err(e) => error_from_shepherd(&e),
        }
    }

    fn render(dispatch: &Dispatch) -> HttpResponse {
        match &dispatch.action {
            RedirectAction::Immediate { destination } => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", destination.as_str()))
                .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
                .finish(),
            RedirectAction::Timed {
                destination,
                seconds,
            } => Self::html(StatusCode::OK, timed_page(dispatch, destination, *seconds)),
            RedirectAction::Advertisement { destination, ad } => Self::html(
                StatusCode::OK,
                advertisement_page(dispatch, destination, ad.as_ref()),
            ),
        }
    }

    #[inline]
    fn html(status: StatusCode, body: String) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .body(body)
    }

    #[inline]
    fn not_found_page() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body(message_page("Link not found", "This short link does not exist."))
    }

    #[inline]
    fn unavailable_page() -> HttpResponse {
        Self::html(
            StatusCode::GONE,
            message_page(
                "Link unavailable",
                "This short link has been disabled and no longer redirects.",
            ),
        )
    }
}

fn page_title(dispatch: &Dispatch) -> String {
    escape_html(dispatch.title.as_deref().unwrap_or(&dispatch.code))
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         {head_extra}<title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn message_page(heading: &str, text: &str) -> String {
    layout(heading, "", &format!("<h1>{heading}</h1>\n<p>{text}</p>"))
}

fn timed_page(dispatch: &Dispatch, destination: &str, seconds: u32) -> String {
    let title = page_title(dispatch);
    let target = escape_html(destination);
    let refresh = format!("<meta http-equiv=\"refresh\" content=\"{seconds};url={target}\">\n");
    let body = format!(
        "<h1>{title}</h1>\n\
         <p>You will be redirected in {seconds} seconds.</p>\n\
         <p><a href=\"{target}\" rel=\"noopener\">Skip and continue</a></p>"
    );
    layout(&title, &refresh, &body)
}

fn advertisement_page(dispatch: &Dispatch, destination: &str, ad: Option<&Advertisement>) -> String {
    let title = page_title(dispatch);
    let target = escape_html(destination);

    let ad_block = match ad {
        Some(ad) => {
            let image = format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(&ad.image_url),
                escape_html(&ad.title)
            );
            let image = match ad.target_url.as_deref() {
                Some(url) => format!(
                    "<a href=\"{}\" rel=\"sponsored noopener\" target=\"_blank\">{image}</a>",
                    escape_html(url)
                ),
                None => image,
            };
            let description = ad
                .description
                .as_deref()
                .map(|d| format!("\n<p>{}</p>", escape_html(d)))
                .unwrap_or_default();
            format!(
                "<div class=\"ad\">\n{image}\n<h2>{}</h2>{description}\n</div>",
                escape_html(&ad.title)
            )
        }
        None => "<div class=\"ad ad-placeholder\"><p>Advertisement</p></div>".to_string(),
    };

    let body = format!(
        "<h1>{title}</h1>\n{ad_block}\n<p><a href=\"{target}\" rel=\"noopener\">Continue to destination</a></p>"
    );
    layout(&title, "", &body)
}

/// 浏览器跳转路由，必须最后注册
pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{path:.*}")
        .route(web::get().to(RedirectService::handle_redirect))
        .route(web::head().to(RedirectService::handle_redirect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dispatch(action: RedirectAction) -> Dispatch {
        Dispatch {
            code: "abc123".to_string(),
            title: Some("<Docs>".to_string()),
            action,
        }
    }

    #[test]
    fn test_timed_page_has_refresh_and_skip_link() {
        let d = dispatch(RedirectAction::Timed {
            destination: "https://example.com/?a=1&b=2".to_string(),
            seconds: 5,
        });
        let html = timed_page(&d, d.action.destination(), 5);
        assert!(html.contains("content=\"5;url=https://example.com/?a=1&amp;b=2\""));
        assert!(html.contains("Skip and continue"));
        assert!(html.contains("&lt;Docs&gt;"));
        assert!(!html.contains("<Docs>"));
    }

    #[test]
    fn test_advertisement_page_with_and_without_ad() {
        let d = dispatch(RedirectAction::Advertisement {
            destination: "https://example.com".to_string(),
            ad: None,
        });
        let html = advertisement_page(&d, "https://example.com", None);
        assert!(html.contains("ad-placeholder"));
        assert!(html.contains("Continue to destination"));

        let ad = Advertisement {
            id: "ad-1".to_string(),
            owner_id: "owner".to_string(),
            title: "Buy \"stuff\"".to_string(),
            description: Some("Cheap".to_string()),
            image_url: "http://localhost:8080/uploads/a.png".to_string(),
            target_url: Some("https://shop.example.com".to_string()),
            is_active: true,
            created_at: Utc::now(),
        };
        let html = advertisement_page(&d, "https://example.com", Some(&ad));
        assert!(html.contains("uploads/a.png"));
        assert!(html.contains("Buy &quot;stuff&quot;"));
        assert!(html.contains("https://shop.example.com"));
        assert!(!html.contains("ad-placeholder"));
    }
}
