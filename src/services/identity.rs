//! 外部身份与人机校验
//!
//! Google userinfo 与 reCAPTCHA siteverify 都是阻塞 HTTP 调用，
//! 统一走一个全局 ureq Agent，并放进 `spawn_blocking` 执行。

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::get_config;
use crate::errors::{Result, ShepherdError};

static HTTP_AGENT: OnceLock<ureq::Agent> = OnceLock::new();

fn http_agent() -> &'static ureq::Agent {
    HTTP_AGENT.get_or_init(|| {
        ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .into()
    })
}

/// Google 返回的用户信息
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 第三方身份提供方
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 用 access token 换取用户信息，token 无效时返回 Unauthorized
    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile>;
}

/// Google OAuth userinfo
pub struct GoogleIdentity {
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            userinfo_url: userinfo_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(get_config().auth.google_userinfo_url.clone())
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile> {
        let url = format!(
            "{}?access_token={}",
            self.userinfo_url,
            urlencoding::encode(access_token)
        );

        let result = tokio::task::spawn_blocking(move || {
            http_agent()
                .get(&url)
                .call()
                .and_then(|resp| resp.into_body().read_json::<GoogleProfile>())
        })
        .await
        .map_err(|e| ShepherdError::internal(format!("Google sign-in task failed: {}", e)))?;

        match result {
            Ok(profile) => Ok(profile),
            Err(ureq::Error::StatusCode(code)) => {
                debug!("Google userinfo rejected token with status {}", code);
                Err(ShepherdError::unauthorized("Invalid Google access token"))
            }
            Err(e) => {
                warn!("Google userinfo request failed: {}", e);
                Err(ShepherdError::unauthorized(
                    "Unable to verify Google access token",
                ))
            }
        }
    }
}

/// 人机校验
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// token 为 None 或未配置密钥时直接通过
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
}

/// Google reCAPTCHA v3
pub struct Recaptcha {
    secret: String,
    verify_url: String,
    min_score: f64,
}

impl Recaptcha {
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>, min_score: f64) -> Self {
        Self {
            secret: secret.into(),
            verify_url: verify_url.into(),
            min_score,
        }
    }

    pub fn from_config() -> Self {
        let auth = &get_config().auth;
        Self::new(
            auth.recaptcha_secret.clone(),
            auth.recaptcha_verify_url.clone(),
            auth.recaptcha_min_score,
        )
    }

    fn judge(&self, resp: &SiteVerifyResponse) -> Result<()> {
        if !resp.success {
            return Err(ShepherdError::validation("reCAPTCHA verification failed"));
        }
        if let Some(score) = resp.score
            && score < self.min_score
        {
            return Err(ShepherdError::validation(format!(
                "reCAPTCHA score too low: {:.2}",
                score
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CaptchaVerifier for Recaptcha {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<()> {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) if !self.secret.is_empty() => t.to_string(),
            _ => return Ok(()),
        };

        let url = self.verify_url.clone();
        let secret = self.secret.clone();
        let remote_ip = remote_ip.map(str::to_string);

        let result = tokio::task::spawn_blocking(move || {
            let mut form = vec![("secret", secret), ("response", token)];
            if let Some(ip) = remote_ip {
                form.push(("remoteip", ip));
            }
            http_agent()
                .post(&url)
                .send_form(form)
                .and_then(|resp| resp.into_body().read_json::<SiteVerifyResponse>())
        })
        .await;

        match result {
            Ok(Ok(resp)) => self.judge(&resp),
            // 校验服务不可达时放行
            Ok(Err(e)) => {
                warn!("reCAPTCHA verifier unreachable, allowing request: {}", e);
                Ok(())
            }
            Err(e) => {
                warn!("reCAPTCHA task failed, allowing request: {}", e);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recaptcha(secret: &str) -> Recaptcha {
        // 不可路由地址，保证测试不会真的发请求
        Recaptcha::new(secret, "http://127.0.0.1:9/siteverify", 0.5)
    }

    #[tokio::test]
    async fn test_skipped_without_secret_or_token() {
        assert!(recaptcha("").verify(Some("token"), None).await.is_ok());
        assert!(recaptcha("secret").verify(None, None).await.is_ok());
        assert!(recaptcha("secret").verify(Some("  "), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_fails_open_when_unreachable() {
        assert!(recaptcha("secret").verify(Some("token"), None).await.is_ok());
    }

    #[test]
    fn test_judge_thresholds() {
        let r = recaptcha("secret");
        assert!(
            r.judge(&SiteVerifyResponse {
                success: true,
                score: Some(0.9)
            })
            .is_ok()
        );
        assert!(
            r.judge(&SiteVerifyResponse {
                success: true,
                score: None
            })
            .is_ok()
        );
        assert!(matches!(
            r.judge(&SiteVerifyResponse {
                success: true,
                score: Some(0.1)
            }),
            Err(ShepherdError::Validation(_))
        ));
        assert!(matches!(
            r.judge(&SiteVerifyResponse {
                success: false,
                score: Some(0.9)
            }),
            Err(ShepherdError::Validation(_))
        ));
    }
}
