//! Link management service
//!
//! Owner-scoped CRUD over short links plus the admin operations. Shared by
//! the HTTP handlers and the CLI.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::code_registry::CodeRegistry;
use crate::errors::{Result, ShepherdError};
use crate::storage::{LinkChanges, LinkState, LinkStats, RedirectMode, SeaOrmStorage, ShortLink};
use crate::utils::url_validator::normalize_url;

/// 生成码在插入时撞上唯一约束的最大重试次数
const MAX_INSERT_ATTEMPTS: usize = 3;

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub destination: String,
    pub title: Option<String>,
    /// Short code (optional, generated if absent)
    pub code: Option<String>,
    pub mode: Option<RedirectMode>,
}

/// Partial update; `None` keeps the current value, an empty title clears it
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkRequest {
    pub destination: Option<String>,
    pub title: Option<String>,
    pub mode: Option<RedirectMode>,
    pub state: Option<LinkState>,
}

/// Result of link creation
#[derive(Debug, Clone)]
pub struct LinkCreateResult {
    pub link: ShortLink,
    /// Whether the code was auto-generated
    pub generated_code: bool,
}

fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

// ============ LinkService Implementation ============

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    registry: Arc<CodeRegistry>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, registry: Arc<CodeRegistry>) -> Self {
        Self { storage, registry }
    }

    /// Create a new short link
    ///
    /// `owner` is `None` only for operator-created links (CLI).
    pub async fn create(
        &self,
        owner: Option<&str>,
        req: CreateLinkRequest,
    ) -> Result<LinkCreateResult> {
        let destination = normalize_url(&req.destination)?;
        let title = clean_title(req.title);
        let mode = req.mode.unwrap_or_default();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let allocated = self.registry.allocate(req.code.as_deref()).await?;

            let link = ShortLink {
                id: uuid::Uuid::new_v4().to_string(),
                code: allocated.code,
                destination: destination.clone(),
                title: title.clone(),
                mode,
                owner: owner.map(str::to_string),
                click_count: 0,
                state: LinkState::Active,
                created_at: Utc::now(),
            };

            match self.storage.insert_link(&link).await {
                Ok(()) => {
                    info!(
                        "LinkService: created '{}' -> '{}' ({})",
                        link.code, link.destination, link.mode
                    );
                    return Ok(LinkCreateResult {
                        link,
                        generated_code: allocated.generated,
                    });
                }
                // 生成码在检查与插入之间被抢占，重新分配
                Err(ShepherdError::Conflict(msg))
                    if allocated.generated && attempt < MAX_INSERT_ATTEMPTS =>
                {
                    warn!("LinkService: generated code lost insert race: {}", msg);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 公开查询；已删除的链接视为不存在
    pub async fn get_by_code(&self, code: &str) -> Result<ShortLink> {
        self.storage
            .find_link_by_code(code)
            .await?
            .filter(|link| link.state != LinkState::Removed)
            .ok_or_else(|| ShepherdError::not_found(format!("Short link '{}' not found", code)))
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<ShortLink>> {
        self.storage.list_links_by_owner(owner).await
    }

    /// 取出调用者拥有的链接，不属于调用者时按不存在处理
    async fn owned_link(&self, owner: &str, id: &str) -> Result<ShortLink> {
        self.storage
            .find_link_by_id(id)
            .await?
            .filter(|link| link.is_owned_by(owner))
            .ok_or_else(|| ShepherdError::not_found(format!("Link '{}' not found", id)))
    }

    /// Owner-scoped partial update
    pub async fn update(&self, owner: &str, id: &str, req: UpdateLinkRequest) -> Result<ShortLink> {
        let existing = self.owned_link(owner, id).await?;

        if existing.state == LinkState::Blocked {
            return Err(ShepherdError::forbidden(
                "This link has been blocked by an administrator",
            ));
        }
        if req.state == Some(LinkState::Blocked) {
            return Err(ShepherdError::forbidden(
                "Only administrators can block links",
            ));
        }

        let destination = match req.destination {
            Some(d) => normalize_url(&d)?,
            None => existing.destination.clone(),
        };
        let title = match req.title {
            Some(t) => clean_title(Some(t)),
            None => existing.title.clone(),
        };

        let changes = LinkChanges {
            destination,
            title,
            mode: req.mode.unwrap_or(existing.mode),
            state: req.state.unwrap_or(existing.state),
        };

        if !self.storage.save_link(id, &changes).await? {
            return Err(ShepherdError::not_found(format!("Link '{}' not found", id)));
        }

        info!("LinkService: updated '{}'", existing.code);
        Ok(ShortLink {
            destination: changes.destination,
            title: changes.title,
            mode: changes.mode,
            state: changes.state,
            ..existing
        })
    }

    /// Soft delete
    pub async fn remove(&self, owner: &str, id: &str) -> Result<()> {
        let existing = self.owned_link(owner, id).await?;

        if existing.state == LinkState::Blocked {
            return Err(ShepherdError::forbidden(
                "This link has been blocked by an administrator",
            ));
        }

        self.storage.set_link_state(id, LinkState::Removed).await?;
        info!("LinkService: removed '{}'", existing.code);
        Ok(())
    }

    /// 点击数 +1，每次调用都会累加
    pub async fn increment_click(&self, id: &str) -> Result<()> {
        if self.storage.increment_clicks(id).await? {
            Ok(())
        } else {
            Err(ShepherdError::not_found(format!("Link '{}' not found", id)))
        }
    }

    /// 预览一个当前未被占用的短码（不落库）
    pub async fn preview_code(&self) -> Result<String> {
        Ok(self.registry.allocate(None).await?.code)
    }

    // ============ Admin Operations ============

    pub async fn list_all(&self, state: Option<LinkState>) -> Result<Vec<ShortLink>> {
        self.storage.list_links(state).await
    }

    /// 管理员可设置任意状态（包括 blocked）
    pub async fn set_state(&self, id: &str, state: LinkState) -> Result<ShortLink> {
        let existing = self
            .storage
            .find_link_by_id(id)
            .await?
            .ok_or_else(|| ShepherdError::not_found(format!("Link '{}' not found", id)))?;

        self.storage.set_link_state(id, state).await?;
        info!(
            "LinkService: admin set '{}' {} -> {}",
            existing.code, existing.state, state
        );

        Ok(ShortLink { state, ..existing })
    }

    pub async fn stats(&self) -> Result<LinkStats> {
        self.storage.link_stats().await
    }
}
