//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;

use crate::errors::ShepherdError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 ShepherdError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_shepherd(err: &ShepherdError) -> HttpResponse {
    if err.http_status().is_server_error() {
        tracing::error!("{}", err.format_simple());
    }
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 ShepherdError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<ShepherdError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_shepherd(&e.into()),
    }
}

/// 客户端 IP（考虑反向代理头）
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| {
            // 去掉端口
            match addr.parse::<std::net::SocketAddr>() {
                Ok(sock) => sock.ip().to_string(),
                Err(_) => addr.to_string(),
            }
        })
}

/// 让 extractor 和 `?` 可以直接返回 ShepherdError
impl ResponseError for ShepherdError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        error_from_shepherd(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_error_envelope() {
        let resp = error_from_shepherd(&ShepherdError::conflict("Short code 'x' is already taken"));
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 1009);
        assert_eq!(json["message"], "Short code 'x' is already taken");
        assert!(json["data"].is_null());
    }

    #[actix_rt::test]
    async fn test_api_result_success() {
        let resp = api_result::<_, ShepherdError>(Ok(vec![1, 2, 3]));
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
