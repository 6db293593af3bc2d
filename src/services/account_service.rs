//! Account and authentication service

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::identity::{CaptchaVerifier, GoogleProfile, IdentityProvider};
use crate::api::jwt::JwtService;
use crate::errors::{Result, ShepherdError};
use crate::storage::{Account, AccountRole, AccountStatus, SeaOrmStorage};
use crate::utils::password::{hash_new_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// 登录/注册成功后返回给客户端的会话
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    /// 秒
    pub expires_in: u64,
    pub user: Account,
}

#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub recaptcha_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    pub recaptcha_token: Option<String>,
}

/// 管理员修改账户
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub role: Option<AccountRole>,
    pub status: Option<AccountStatus>,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ShepherdError::validation("A valid email address is required"));
    }
    Ok(email)
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn ensure_active(account: &Account) -> Result<()> {
    match account.status {
        AccountStatus::Active => Ok(()),
        AccountStatus::Suspended => Err(ShepherdError::forbidden("Account is suspended")),
    }
}

pub struct AccountService {
    storage: Arc<SeaOrmStorage>,
    jwt: &'static JwtService,
    identity: Arc<dyn IdentityProvider>,
    captcha: Arc<dyn CaptchaVerifier>,
}

impl AccountService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        jwt: &'static JwtService,
        identity: Arc<dyn IdentityProvider>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Self {
        Self {
            storage,
            jwt,
            identity,
            captcha,
        }
    }

    fn session_for(&self, account: Account) -> Result<AuthSession> {
        let access_token = self
            .jwt
            .issue(&account)
            .map_err(|e| ShepherdError::internal(format!("Failed to issue token: {}", e)))?;
        Ok(AuthSession {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expires_in(),
            user: account,
        })
    }

    pub async fn sign_up(&self, req: SignUpRequest, remote_ip: Option<&str>) -> Result<AuthSession> {
        self.captcha
            .verify(req.recaptcha_token.as_deref(), remote_ip)
            .await?;

        let email = normalize_email(&req.email)?;
        let password_hash = hash_new_password(&req.password)?;

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: Some(password_hash),
            full_name: clean_name(req.full_name),
            google_id: None,
            role: AccountRole::User,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };

        self.storage.insert_account(&account).await?;
        info!("AccountService: signed up {}", account.email);
        self.session_for(account)
    }

    pub async fn sign_in(&self, req: SignInRequest, remote_ip: Option<&str>) -> Result<AuthSession> {
        self.captcha
            .verify(req.recaptcha_token.as_deref(), remote_ip)
            .await?;

        let email = req.email.trim().to_lowercase();
        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| ShepherdError::unauthorized(INVALID_CREDENTIALS))?;

        // 仅 Google 登录的账户没有密码
        let hash = account
            .password_hash
            .as_deref()
            .ok_or_else(|| ShepherdError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(&req.password, hash)? {
            return Err(ShepherdError::unauthorized(INVALID_CREDENTIALS));
        }

        ensure_active(&account)?;
        info!("AccountService: signed in {}", account.email);
        self.session_for(account)
    }

    /// 使用 Google access token 登录
    pub async fn sign_in_with_google(&self, access_token: &str) -> Result<AuthSession> {
        if access_token.trim().is_empty() {
            return Err(ShepherdError::validation("Google access token is required"));
        }
        let profile = self.identity.fetch_profile(access_token.trim()).await?;
        self.sign_in_with_profile(profile).await
    }

    /// 根据第三方资料登录：按 google_id、邮箱依次匹配，都没有时注册新账户
    pub async fn sign_in_with_profile(&self, profile: GoogleProfile) -> Result<AuthSession> {
        let email = normalize_email(profile.email.as_deref().unwrap_or_default())
            .map_err(|_| ShepherdError::unauthorized("Google account has no email address"))?;

        if let Some(account) = self.storage.find_account_by_google_id(&profile.sub).await? {
            ensure_active(&account)?;
            return self.session_for(account);
        }

        if let Some(mut account) = self.storage.find_account_by_email(&email).await? {
            ensure_active(&account)?;
            if account.google_id.is_none() {
                account.google_id = Some(profile.sub.clone());
                if account.full_name.is_none() {
                    account.full_name = clean_name(profile.name.clone());
                }
                self.storage.update_account(&account).await?;
                info!("AccountService: linked Google identity to {}", account.email);
            }
            return self.session_for(account);
        }

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: None,
            full_name: clean_name(profile.name),
            google_id: Some(profile.sub),
            role: AccountRole::User,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };
        self.storage.insert_account(&account).await?;
        info!("AccountService: signed up {} via Google", account.email);
        self.session_for(account)
    }

    pub async fn me(&self, account_id: &str) -> Result<Account> {
        self.storage
            .find_account_by_id(account_id)
            .await?
            .ok_or_else(|| ShepherdError::not_found("Account not found"))
    }

    // ============ Admin Operations ============

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.storage.list_accounts().await
    }

    /// 修改角色/状态；已签发的 token 在下一次请求时按新值校验
    pub async fn update_account(&self, id: &str, update: AccountUpdate) -> Result<Account> {
        let mut account = self
            .storage
            .find_account_by_id(id)
            .await?
            .ok_or_else(|| ShepherdError::not_found(format!("Account '{}' not found", id)))?;

        if update.role.is_none() && update.status.is_none() {
            return Err(ShepherdError::validation("Nothing to update"));
        }
        if let Some(role) = update.role {
            account.role = role;
        }
        if let Some(status) = update.status {
            account.status = status;
        }

        self.storage.update_account(&account).await?;
        info!(
            "AccountService: {} is now {} / {}",
            account.email, account.role, account.status
        );
        Ok(account)
    }

    /// 创建管理员；邮箱已存在时提升为管理员并重设密码。返回 (账户, 是否新建)
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<(Account, bool)> {
        let email = normalize_email(email)?;
        let password_hash = hash_new_password(password)?;

        if let Some(mut account) = self.storage.find_account_by_email(&email).await? {
            account.role = AccountRole::Admin;
            account.status = AccountStatus::Active;
            account.password_hash = Some(password_hash);
            if let Some(name) = clean_name(full_name) {
                account.full_name = Some(name);
            }
            self.storage.update_account(&account).await?;
            info!("AccountService: promoted {} to admin", account.email);
            return Ok((account, false));
        }

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: Some(password_hash),
            full_name: clean_name(full_name),
            google_id: None,
            role: AccountRole::Admin,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };
        self.storage.insert_account(&account).await?;
        info!("AccountService: created admin {}", account.email);
        Ok((account, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  User@Example.COM ").unwrap(),
            "user@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("   ").is_err());
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name(Some("  Ada ".to_string())), Some("Ada".to_string()));
        assert_eq!(clean_name(Some("   ".to_string())), None);
        assert_eq!(clean_name(None), None);
    }
}
