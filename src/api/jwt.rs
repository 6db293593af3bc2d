use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::storage::{Account, AccountRole};

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
///
/// Initialized once from `[auth]` on first use and reused for all
/// subsequent requests.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

/// Access Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 账户 id
    pub sub: String,
    pub email: String,
    pub role: AccountRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_hours: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_hours,
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        let auth = &crate::config::get_config().auth;

        // 未配置时生成随机密钥，重启后旧 token 全部失效
        let secret = if auth.jwt_secret.is_empty() {
            tracing::warn!("JWT secret not configured, generating a random one for this process");
            crate::utils::generate_random_code(48)
        } else {
            auth.jwt_secret.clone()
        };

        Self::new(&secret, auth.token_hours.max(1))
    }

    /// token 有效期（秒）
    pub fn expires_in(&self) -> u64 {
        self.token_hours * 3600
    }

    /// 为账户签发 access token
    pub fn issue(&self, account: &Account) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.clone(),
            email: account.email.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate access token (signature + exp)
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AccountStatus;

    const SECRET: &str = "test_secret_key_32_bytes_long!!";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, 24)
    }

    fn account(role: AccountRole) -> Account {
        Account {
            id: "acct-1".to_string(),
            email: "user@example.com".to_string(),
            password_hash: None,
            full_name: None,
            google_id: None,
            role,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue(&account(AccountRole::Admin)).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, AccountRole::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(service.expires_in(), 24 * 3600);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let service = create_test_service();
        let a = service.validate(&service.issue(&account(AccountRole::User)).unwrap()).unwrap();
        let b = service.validate(&service.issue(&account(AccountRole::User)).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new("different_secret_key_32_bytes!!", 24);

        let token = service1.issue(&account(AccountRole::User)).unwrap();
        assert!(service2.validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // 过期时间早于默认 leeway
        let now = Utc::now();
        let claims = Claims {
            sub: "acct-1".to_string(),
            email: "user@example.com".to_string(),
            role: AccountRole::User,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }
}
