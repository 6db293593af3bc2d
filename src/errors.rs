use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ShepherdError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    Unavailable(String),
    Serialization(String),
    Internal(String),
}

impl ShepherdError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShepherdError::DatabaseConfig(_) => "E001",
            ShepherdError::DatabaseConnection(_) => "E002",
            ShepherdError::DatabaseOperation(_) => "E003",
            ShepherdError::FileOperation(_) => "E004",
            ShepherdError::Validation(_) => "E005",
            ShepherdError::NotFound(_) => "E006",
            ShepherdError::Conflict(_) => "E007",
            ShepherdError::Unauthorized(_) => "E008",
            ShepherdError::Forbidden(_) => "E009",
            ShepherdError::Unavailable(_) => "E010",
            ShepherdError::Serialization(_) => "E011",
            ShepherdError::Internal(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShepherdError::DatabaseConfig(_) => "Database Configuration Error",
            ShepherdError::DatabaseConnection(_) => "Database Connection Error",
            ShepherdError::DatabaseOperation(_) => "Database Operation Error",
            ShepherdError::FileOperation(_) => "File Operation Error",
            ShepherdError::Validation(_) => "Validation Error",
            ShepherdError::NotFound(_) => "Resource Not Found",
            ShepherdError::Conflict(_) => "Conflict",
            ShepherdError::Unauthorized(_) => "Unauthorized",
            ShepherdError::Forbidden(_) => "Forbidden",
            ShepherdError::Unavailable(_) => "Unavailable",
            ShepherdError::Serialization(_) => "Serialization Error",
            ShepherdError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShepherdError::DatabaseConfig(msg)
            | ShepherdError::DatabaseConnection(msg)
            | ShepherdError::DatabaseOperation(msg)
            | ShepherdError::FileOperation(msg)
            | ShepherdError::Validation(msg)
            | ShepherdError::NotFound(msg)
            | ShepherdError::Conflict(msg)
            | ShepherdError::Unauthorized(msg)
            | ShepherdError::Forbidden(msg)
            | ShepherdError::Unavailable(msg)
            | ShepherdError::Serialization(msg)
            | ShepherdError::Internal(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShepherdError::Validation(_) => StatusCode::BAD_REQUEST,
            ShepherdError::NotFound(_) => StatusCode::NOT_FOUND,
            ShepherdError::Conflict(_) => StatusCode::CONFLICT,
            ShepherdError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShepherdError::Forbidden(_) => StatusCode::FORBIDDEN,
            ShepherdError::Unavailable(_) => StatusCode::GONE,
            ShepherdError::DatabaseConfig(_)
            | ShepherdError::DatabaseConnection(_)
            | ShepherdError::DatabaseOperation(_)
            | ShepherdError::FileOperation(_)
            | ShepherdError::Serialization(_)
            | ShepherdError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShepherdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShepherdError {}

// 便捷的构造函数
impl ShepherdError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShepherdError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShepherdError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShepherdError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShepherdError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShepherdError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Forbidden(msg.into())
    }

    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Unavailable(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Serialization(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        ShepherdError::Internal(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShepherdError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShepherdError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShepherdError {
    fn from(err: std::io::Error) -> Self {
        ShepherdError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShepherdError {
    fn from(err: serde_json::Error) -> Self {
        ShepherdError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ShepherdError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ShepherdError::Unauthorized(format!("Invalid token: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ShepherdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ShepherdError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShepherdError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShepherdError::conflict("x").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ShepherdError::unauthorized("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ShepherdError::forbidden("x").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ShepherdError::unavailable("x").http_status(),
            StatusCode::GONE
        );
        assert_eq!(
            ShepherdError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = ShepherdError::conflict("Short code 'abc' is already taken");
        assert_eq!(
            err.format_simple(),
            "Conflict: Short code 'abc' is already taken"
        );
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ShepherdError = io_err.into();
        assert!(matches!(err, ShepherdError::FileOperation(_)));
        assert_eq!(err.code(), "E004");
    }
}
