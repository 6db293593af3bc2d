//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ShepherdError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 链接错误
/// - 4000-4099: 广告错误
/// - 5000-5099: 举报 / 会话 / 站点设置错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    FileTooLarge = 1011,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenInvalid = 2002,
    AccountSuspended = 2005,
    EmailTaken = 2006,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkInvalidCode = 3007,
    LinkUnavailable = 3008,

    // 广告错误 4000-4099
    AdNotFound = 4000,
    InvalidMultipartData = 4002,
    AdInvalidImage = 4003,

    // 举报 / 会话 / 设置错误 5000-5099
    ReportNotFound = 5000,
    SessionInvalid = 5010,
    SettingsUpdateFailed = 5020,
}

impl From<&ShepherdError> for ErrorCode {
    fn from(err: &ShepherdError) -> Self {
        match err {
            ShepherdError::Validation(_) => ErrorCode::BadRequest,
            ShepherdError::NotFound(_) => ErrorCode::NotFound,
            ShepherdError::Conflict(_) => ErrorCode::Conflict,
            ShepherdError::Unauthorized(_) => ErrorCode::Unauthorized,
            ShepherdError::Forbidden(_) => ErrorCode::Forbidden,
            ShepherdError::Unavailable(_) => ErrorCode::LinkUnavailable,
            ShepherdError::DatabaseConfig(_)
            | ShepherdError::DatabaseConnection(_)
            | ShepherdError::DatabaseOperation(_)
            | ShepherdError::FileOperation(_)
            | ShepherdError::Serialization(_)
            | ShepherdError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
        assert_eq!(
            serde_json::to_string(&ErrorCode::LinkAlreadyExists).unwrap(),
            "3001"
        );
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ErrorCode::from(&ShepherdError::unavailable("gone")),
            ErrorCode::LinkUnavailable
        );
        assert_eq!(
            ErrorCode::from(&ShepherdError::database_operation("boom")),
            ErrorCode::InternalServerError
        );
    }
}
