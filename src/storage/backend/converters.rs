//! 实体模型与领域模型之间的转换

use std::str::FromStr;

use sea_orm::ActiveValue::Set;
use tracing::warn;

use crate::storage::models::{
    Account, AccountRole, AccountStatus, Advertisement, LinkState, RedirectMode, Report,
    ReportStatus, ShortLink, SiteSettings, UserSession,
};
use migration::entities::{
    account, advertisement, report, short_link, site_settings, user_session,
};

/// 解析数据库中的枚举字符串，未知值记录警告并回退
fn parse_or<T: FromStr + Copy + std::fmt::Display>(raw: &str, fallback: T, what: &str) -> T {
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(
                "Unknown {} '{}' in database, falling back to '{}'",
                what, raw, fallback
            );
            fallback
        }
    }
}

fn parse_json(raw: Option<String>) -> Option<serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

fn json_text(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

pub fn model_to_link(model: short_link::Model) -> ShortLink {
    ShortLink {
        id: model.id,
        code: model.short_code,
        destination: model.original_url,
        title: model.title,
        mode: parse_or(&model.redirect_mode, RedirectMode::Immediate, "redirect mode"),
        owner: model.owner_id,
        click_count: model.click_count.max(0) as u64,
        // 无法识别的状态一律视为不可跳转
        state: parse_or(&model.status, LinkState::Inactive, "link state"),
        created_at: model.created_at,
    }
}

pub fn link_to_active_model(link: &ShortLink) -> short_link::ActiveModel {
    short_link::ActiveModel {
        id: Set(link.id.clone()),
        short_code: Set(link.code.clone()),
        original_url: Set(link.destination.clone()),
        title: Set(link.title.clone()),
        redirect_mode: Set(link.mode.to_string()),
        owner_id: Set(link.owner.clone()),
        click_count: Set(link.click_count.min(i64::MAX as u64) as i64),
        status: Set(link.state.to_string()),
        created_at: Set(link.created_at),
    }
}

pub fn model_to_account(model: account::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        google_id: model.google_id,
        role: parse_or(&model.role, AccountRole::User, "account role"),
        status: parse_or(&model.status, AccountStatus::Suspended, "account status"),
        created_at: model.created_at,
    }
}

pub fn account_to_active_model(account: &Account) -> account::ActiveModel {
    account::ActiveModel {
        id: Set(account.id.clone()),
        email: Set(account.email.clone()),
        password_hash: Set(account.password_hash.clone()),
        full_name: Set(account.full_name.clone()),
        google_id: Set(account.google_id.clone()),
        role: Set(account.role.to_string()),
        status: Set(account.status.to_string()),
        created_at: Set(account.created_at),
    }
}

pub fn model_to_report(model: report::Model) -> Report {
    Report {
        id: model.id,
        link_id: model.link_id,
        link_code: model.link_code,
        reporter_email: model.reporter_email,
        reason: model.reason,
        description: model.description,
        status: parse_or(&model.status, ReportStatus::Pending, "report status"),
        admin_response: model.admin_response,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn report_to_active_model(report: &Report) -> report::ActiveModel {
    report::ActiveModel {
        id: Set(report.id.clone()),
        link_id: Set(report.link_id.clone()),
        link_code: Set(report.link_code.clone()),
        reporter_email: Set(report.reporter_email.clone()),
        reason: Set(report.reason.clone()),
        description: Set(report.description.clone()),
        status: Set(report.status.to_string()),
        admin_response: Set(report.admin_response.clone()),
        created_at: Set(report.created_at),
        updated_at: Set(report.updated_at),
    }
}

pub fn model_to_session(model: user_session::Model) -> UserSession {
    UserSession {
        id: model.id,
        session_id: model.session_id,
        user_id: model.user_id,
        user_agent: model.user_agent,
        browser_info: parse_json(model.browser_info),
        cookies_data: parse_json(model.cookies_data),
        referrer: model.referrer,
        device_type: model.device_type,
        screen_resolution: model.screen_resolution,
        ip_address: model.ip_address,
        page_views: model.page_views.max(0) as u64,
        last_activity: model.last_activity,
        created_at: model.created_at,
    }
}

pub fn session_to_active_model(session: &UserSession) -> user_session::ActiveModel {
    user_session::ActiveModel {
        id: Set(session.id.clone()),
        session_id: Set(session.session_id.clone()),
        user_id: Set(session.user_id.clone()),
        user_agent: Set(session.user_agent.clone()),
        browser_info: Set(json_text(&session.browser_info)),
        cookies_data: Set(json_text(&session.cookies_data)),
        referrer: Set(session.referrer.clone()),
        device_type: Set(session.device_type.clone()),
        screen_resolution: Set(session.screen_resolution.clone()),
        ip_address: Set(session.ip_address.clone()),
        page_views: Set(session.page_views.min(i64::MAX as u64) as i64),
        last_activity: Set(session.last_activity),
        created_at: Set(session.created_at),
    }
}

pub(crate) fn json_to_text(value: &serde_json::Value) -> String {
    value.to_string()
}

pub fn model_to_advertisement(model: advertisement::Model) -> Advertisement {
    Advertisement {
        id: model.id,
        owner_id: model.owner_id,
        title: model.title,
        description: model.description,
        image_url: model.image_url,
        target_url: model.target_url,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

pub fn advertisement_to_active_model(ad: &Advertisement) -> advertisement::ActiveModel {
    advertisement::ActiveModel {
        id: Set(ad.id.clone()),
        owner_id: Set(ad.owner_id.clone()),
        title: Set(ad.title.clone()),
        description: Set(ad.description.clone()),
        image_url: Set(ad.image_url.clone()),
        target_url: Set(ad.target_url.clone()),
        is_active: Set(ad.is_active),
        created_at: Set(ad.created_at),
    }
}

/// site_settings 表固定主键
pub const SITE_SETTINGS_ID: i32 = 1;

pub fn model_to_settings(model: site_settings::Model) -> SiteSettings {
    SiteSettings {
        adsense_client_id: model.adsense_client_id,
        adsense_timer_slot: model.adsense_timer_slot,
        adsense_ad_slot: model.adsense_ad_slot,
        adsense_enabled: model.adsense_enabled,
        updated_at: model.updated_at,
    }
}

pub fn settings_to_active_model(settings: &SiteSettings) -> site_settings::ActiveModel {
    site_settings::ActiveModel {
        id: Set(SITE_SETTINGS_ID),
        adsense_client_id: Set(settings.adsense_client_id.clone()),
        adsense_timer_slot: Set(settings.adsense_timer_slot.clone()),
        adsense_ad_slot: Set(settings.adsense_ad_slot.clone()),
        adsense_enabled: Set(settings.adsense_enabled),
        updated_at: Set(settings.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn link_model(status: &str, mode: &str) -> short_link::Model {
        short_link::Model {
            id: "id-1".to_string(),
            short_code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            title: Some("Example".to_string()),
            redirect_mode: mode.to_string(),
            owner_id: Some("owner".to_string()),
            click_count: 7,
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_model_conversion() {
        let link = model_to_link(link_model("active", "timer"));
        assert_eq!(link.code, "abc123");
        assert_eq!(link.mode, RedirectMode::Timed);
        assert_eq!(link.state, LinkState::Active);
        assert_eq!(link.click_count, 7);
    }

    #[test]
    fn test_unknown_state_is_not_active() {
        let link = model_to_link(link_model("mystery", "teleport"));
        assert_eq!(link.state, LinkState::Inactive);
        assert_eq!(link.mode, RedirectMode::Immediate);
    }

    #[test]
    fn test_negative_counters_clamp_to_zero() {
        let mut model = link_model("active", "immediate");
        model.click_count = -3;
        assert_eq!(model_to_link(model).click_count, 0);
    }

    #[test]
    fn test_session_json_fields() {
        let model = user_session::Model {
            id: "s".to_string(),
            session_id: "sess-1".to_string(),
            user_id: None,
            user_agent: None,
            browser_info: Some(r#"{"lang":"en"}"#.to_string()),
            cookies_data: Some("not json".to_string()),
            referrer: None,
            device_type: None,
            screen_resolution: None,
            ip_address: None,
            page_views: 3,
            last_activity: Utc::now(),
            created_at: Utc::now(),
        };
        let session = model_to_session(model);
        assert_eq!(session.browser_info.unwrap()["lang"], "en");
        assert!(session.cookies_data.is_none());
        assert_eq!(session.page_views, 3);
    }

    #[test]
    fn test_account_unknown_status_is_suspended() {
        let model = account::Model {
            id: "a".to_string(),
            email: "a@example.com".to_string(),
            password_hash: None,
            full_name: None,
            google_id: None,
            role: "admin".to_string(),
            status: "weird".to_string(),
            created_at: Utc::now(),
        };
        let account = model_to_account(model);
        assert!(account.is_admin());
        assert_eq!(account.status, AccountStatus::Suspended);
    }
}
