use std::sync::Arc;

use serde::Serialize;

use crate::errors::{Result, ShepherdError};
use crate::storage::{SeaOrmStorage, SessionTouch, UserSession};

/// 管理端最近会话数量
pub const RECENT_SESSION_LIMIT: u64 = 100;
/// 单个用户最近会话数量
pub const USER_SESSION_LIMIT: u64 = 10;

/// 会话附带账户信息
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: UserSession,
    pub user_email: Option<String>,
    pub user_full_name: Option<String>,
}

pub struct SessionService {
    storage: Arc<SeaOrmStorage>,
}

impl SessionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn track(&self, session_id: &str, touch: SessionTouch) -> Result<()> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ShepherdError::validation("session_id is required"));
        }
        self.storage.touch_session(session_id, &touch).await
    }

    pub async fn recent(&self) -> Result<Vec<SessionView>> {
        let sessions = self.storage.list_recent_sessions(RECENT_SESSION_LIMIT).await?;
        self.attach_accounts(sessions).await
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<SessionView>> {
        let sessions = self
            .storage
            .list_sessions_for_user(user_id, USER_SESSION_LIMIT)
            .await?;
        self.attach_accounts(sessions).await
    }

    async fn attach_accounts(&self, sessions: Vec<UserSession>) -> Result<Vec<SessionView>> {
        let mut ids: Vec<String> = sessions.iter().filter_map(|s| s.user_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let accounts = self.storage.find_accounts_by_ids(&ids).await?;

        Ok(sessions
            .into_iter()
            .map(|session| {
                let account = session.user_id.as_ref().and_then(|id| accounts.get(id));
                SessionView {
                    user_email: account.map(|a| a.email.clone()),
                    user_full_name: account.and_then(|a| a.full_name.clone()),
                    session,
                }
            })
            .collect())
    }
}
