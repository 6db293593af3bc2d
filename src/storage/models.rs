//! 领域模型
//!
//! 存储层与服务层之间传递的数据结构。枚举在数据库中以小写字符串保存。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

/// 为小写字符串枚举生成 Display / FromStr
macro_rules! lowercase_enum {
    ($name:ident, $label:literal $(, $alias:literal => $variant:ident)*) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_lowercase();
                $(
                    if lower == $alias {
                        return Ok(Self::$variant);
                    }
                )*
                Self::iter()
                    .find(|v| v.as_ref() == lower)
                    .ok_or_else(|| {
                        let valid: Vec<&'static str> =
                            Self::iter().map(<&'static str>::from).collect();
                        format!("Invalid {}: '{}'. Valid: {}", $label, s, valid.join(", "))
                    })
            }
        }
    };
}

/// 跳转方式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RedirectMode {
    #[default]
    #[serde(alias = "direct")]
    Immediate,
    #[serde(alias = "timer")]
    Timed,
    #[serde(alias = "ad")]
    Advertisement,
}

lowercase_enum!(RedirectMode, "redirect mode", "direct" => Immediate, "timer" => Timed, "ad" => Advertisement);

/// 链接生命周期状态，只有 Active 可以跳转
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkState {
    #[default]
    Active,
    Inactive,
    #[serde(alias = "banned")]
    Blocked,
    #[serde(alias = "deleted")]
    Removed,
}

lowercase_enum!(LinkState, "link state", "banned" => Blocked, "deleted" => Removed);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

lowercase_enum!(AccountRole, "role");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
}

lowercase_enum!(AccountStatus, "account status");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
}

lowercase_enum!(ReportStatus, "report status");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortLink {
    pub id: String,
    pub code: String,
    pub destination: String,
    pub title: Option<String>,
    pub mode: RedirectMode,
    pub owner: Option<String>,
    #[serde(default)]
    pub click_count: u64,
    pub state: LinkState,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    #[inline]
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.owner.as_deref() == Some(account_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub google_id: Option<String>,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub link_id: String,
    pub link_code: String,
    pub reporter_email: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_agent: Option<String>,
    pub browser_info: Option<serde_json::Value>,
    pub cookies_data: Option<serde_json::Value>,
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub screen_resolution: Option<String>,
    pub ip_address: Option<String>,
    pub page_views: u64,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 会话上报中可更新的客户端信息
#[derive(Debug, Clone, Default)]
pub struct SessionTouch {
    pub user_id: Option<String>,
    pub user_agent: Option<String>,
    pub browser_info: Option<serde_json::Value>,
    pub cookies_data: Option<serde_json::Value>,
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub screen_resolution: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub target_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSettings {
    pub adsense_client_id: Option<String>,
    pub adsense_timer_slot: Option<String>,
    pub adsense_ad_slot: Option<String>,
    pub adsense_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            adsense_client_id: None,
            adsense_timer_slot: None,
            adsense_ad_slot: None,
            adsense_enabled: false,
            updated_at: Utc::now(),
        }
    }
}

/// 链接统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkStats {
    pub total_links: u64,
    pub active_links: u64,
    pub total_clicks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trip_through_str() {
        for mode in RedirectMode::iter() {
            assert_eq!(mode.to_string().parse::<RedirectMode>().unwrap(), mode);
        }
        for state in LinkState::iter() {
            assert_eq!(state.to_string().parse::<LinkState>().unwrap(), state);
        }
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!("direct".parse::<RedirectMode>(), Ok(RedirectMode::Immediate));
        assert_eq!("timer".parse::<RedirectMode>(), Ok(RedirectMode::Timed));
        assert_eq!("ad".parse::<RedirectMode>(), Ok(RedirectMode::Advertisement));
        assert_eq!("banned".parse::<LinkState>(), Ok(LinkState::Blocked));
        assert_eq!("deleted".parse::<LinkState>(), Ok(LinkState::Removed));

        let mode: RedirectMode = serde_json::from_str("\"timer\"").unwrap();
        assert_eq!(mode, RedirectMode::Timed);
    }

    #[test]
    fn test_invalid_value_lists_options() {
        let err = "sideways".parse::<RedirectMode>().unwrap_err();
        assert!(err.contains("immediate, timed, advertisement"));
    }

    #[test]
    fn test_account_serialization_hides_secrets() {
        let account = Account {
            id: "a1".to_string(),
            email: "a@example.com".to_string(),
            password_hash: Some("$argon2id$...".to_string()),
            full_name: None,
            google_id: Some("g-1".to_string()),
            role: AccountRole::User,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("google_id").is_none());
        assert_eq!(json["role"], "user");
    }
}
