//! Redirect dispatcher
//!
//! Resolves a short code into the next client action. Only active links
//! resolve; the click counter is bumped best-effort before branching on the
//! redirect mode.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::get_config;
use crate::errors::{Result, ShepherdError};
use crate::storage::{Advertisement, LinkState, RedirectMode, SeaOrmStorage, ShortLink};

/// 跳转指令
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RedirectAction {
    /// 直接跳转
    Immediate { destination: String },
    /// 倒计时后跳转，可跳过
    Timed { destination: String, seconds: u32 },
    /// 展示广告后跳转；没有可用广告时 ad 为 None（前端显示占位）
    Advertisement {
        destination: String,
        ad: Option<Advertisement>,
    },
}

impl RedirectAction {
    pub fn destination(&self) -> &str {
        match self {
            Self::Immediate { destination }
            | Self::Timed { destination, .. }
            | Self::Advertisement { destination, .. } => destination,
        }
    }
}

/// 解析结果
#[derive(Debug, Clone, Serialize)]
pub struct Dispatch {
    pub code: String,
    pub title: Option<String>,
    #[serde(flatten)]
    pub action: RedirectAction,
}

pub struct RedirectDispatcher {
    storage: Arc<SeaOrmStorage>,
    timer_seconds: u32,
}

impl RedirectDispatcher {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self::with_timer(storage, get_config().links.timer_seconds)
    }

    pub fn with_timer(storage: Arc<SeaOrmStorage>, timer_seconds: u32) -> Self {
        Self {
            storage,
            timer_seconds,
        }
    }

    /// 解析短码并计一次点击
    pub async fn resolve(&self, code: &str) -> Result<Dispatch> {
        self.dispatch(code, true).await
    }

    /// 与 `resolve` 相同，但不计点击（HEAD 请求、链接预览）
    pub async fn peek(&self, code: &str) -> Result<Dispatch> {
        self.dispatch(code, false).await
    }

    async fn dispatch(&self, code: &str, count_click: bool) -> Result<Dispatch> {
        let link = self
            .storage
            .find_link_by_code(code)
            .await?
            .ok_or_else(|| ShepherdError::not_found(format!("Short link '{}' not found", code)))?;

        if link.state != LinkState::Active {
            debug!("Dispatcher: '{}' is {}", code, link.state);
            return Err(ShepherdError::unavailable(format!(
                "Short link '{}' is no longer available",
                code
            )));
        }

        if count_click {
            self.record_click(&link).await;
        }

        let action = match link.mode {
            RedirectMode::Immediate => RedirectAction::Immediate {
                destination: link.destination,
            },
            RedirectMode::Timed => RedirectAction::Timed {
                destination: link.destination,
                seconds: self.timer_seconds,
            },
            RedirectMode::Advertisement => RedirectAction::Advertisement {
                destination: link.destination,
                ad: self.pick_ad().await,
            },
        };

        Ok(Dispatch {
            code: link.code,
            title: link.title,
            action,
        })
    }

    /// 点击计数失败只记录日志，不影响跳转
    async fn record_click(&self, link: &ShortLink) {
        if let Err(e) = self.storage.increment_clicks(&link.id).await {
            warn!("Dispatcher: failed to record click for '{}': {}", link.code, e);
        }
    }

    async fn pick_ad(&self) -> Option<Advertisement> {
        match self.storage.random_active_advertisement().await {
            Ok(ad) => ad,
            Err(e) => {
                warn!("Dispatcher: advertisement lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization_is_tagged() {
        let action = RedirectAction::Timed {
            destination: "https://example.com".to_string(),
            seconds: 5,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["mode"], "timed");
        assert_eq!(json["seconds"], 5);

        let action = RedirectAction::Advertisement {
            destination: "https://example.com".to_string(),
            ad: None,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["mode"], "advertisement");
        assert!(json["ad"].is_null());
    }

    #[test]
    fn test_dispatch_flattens_action() {
        let dispatch = Dispatch {
            code: "abc".to_string(),
            title: None,
            action: RedirectAction::Immediate {
                destination: "https://example.com".to_string(),
            },
        };
        let json = serde_json::to_value(&dispatch).unwrap();
        assert_eq!(json["code"], "abc");
        assert_eq!(json["mode"], "immediate");
        assert_eq!(json["destination"], "https://example.com");
        assert_eq!(dispatch.action.destination(), "https://example.com");
    }
}
