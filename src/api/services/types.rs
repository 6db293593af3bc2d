//! API 类型定义

use serde::{Deserialize, Serialize};

use crate::storage::{AccountRole, AccountStatus, LinkState, RedirectMode, ReportStatus};

/// 统一响应信封，code = 0 表示成功
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

// ============ Auth ============

#[derive(Deserialize, Clone, Debug)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, alias = "recaptchaToken")]
    pub recaptcha_token: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "recaptchaToken")]
    pub recaptcha_token: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GoogleSignInBody {
    pub access_token: String,
}

// ============ Links ============

#[derive(Deserialize, Clone, Debug)]
pub struct CreateLinkBody {
    #[serde(alias = "original_url", alias = "target")]
    pub destination: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "short_code", alias = "custom_code")]
    pub code: Option<String>,
    #[serde(default, alias = "redirect_mode")]
    pub mode: Option<RedirectMode>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdateLinkBody {
    #[serde(default, alias = "original_url", alias = "target")]
    pub destination: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "redirect_mode")]
    pub mode: Option<RedirectMode>,
    #[serde(default, alias = "status")]
    pub state: Option<LinkState>,
}

#[derive(Serialize, Clone, Debug)]
pub struct GeneratedCode {
    pub code: String,
}

// ============ Reports ============

#[derive(Deserialize, Clone, Debug)]
pub struct CreateReportBody {
    #[serde(default, alias = "short_code")]
    pub link_code: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    pub reporter_email: String,
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct UpdateReportBody {
    #[serde(default)]
    pub status: Option<ReportStatus>,
    #[serde(default)]
    pub admin_response: Option<String>,
}

// ============ Sessions ============

#[derive(Deserialize, Clone, Debug)]
pub struct TrackSessionBody {
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub browser_info: Option<serde_json::Value>,
    #[serde(default)]
    pub cookies_data: Option<serde_json::Value>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub screen_resolution: Option<String>,
}

// ============ Settings ============

#[derive(Deserialize, Clone, Debug)]
pub struct UpdateSettingsBody {
    #[serde(default)]
    pub adsense_client_id: Option<String>,
    #[serde(default)]
    pub adsense_timer_slot: Option<String>,
    #[serde(default)]
    pub adsense_ad_slot: Option<String>,
    #[serde(default)]
    pub adsense_enabled: Option<bool>,
}

// ============ Admin ============

#[derive(Deserialize, Clone, Debug)]
pub struct UpdateAccountBody {
    #[serde(default)]
    pub role: Option<AccountRole>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LinkStateBody {
    #[serde(alias = "status")]
    pub state: LinkState,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AdminLinksQuery {
    #[serde(default, alias = "status")]
    pub state: Option<LinkState>,
}
