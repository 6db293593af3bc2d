//! 访客会话：按 session_id 累加访问量

use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use tracing::debug;

use super::converters::{json_to_text, model_to_session, session_to_active_model};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::{SessionTouch, UserSession};

use migration::entities::user_session;

impl SeaOrmStorage {
    /// 记录一次访问
    ///
    /// 已存在的会话 page_views + 1 并刷新 last_activity，只覆盖本次上报的字段；
    /// 不存在时插入 page_views = 1 的新会话。
    pub async fn touch_session(&self, session_id: &str, touch: &SessionTouch) -> Result<()> {
        if self.bump_session(session_id, touch).await? {
            return Ok(());
        }

        let now = Utc::now();
        let session = UserSession {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            user_id: touch.user_id.clone(),
            user_agent: touch.user_agent.clone(),
            browser_info: touch.browser_info.clone(),
            cookies_data: touch.cookies_data.clone(),
            referrer: touch.referrer.clone(),
            device_type: touch.device_type.clone(),
            screen_resolution: touch.screen_resolution.clone(),
            ip_address: touch.ip_address.clone(),
            page_views: 1,
            last_activity: now,
            created_at: now,
        };

        let db = &self.db;
        let inserted = retry::with_retry("insert_session", self.retry_config, || async {
            user_session::Entity::insert(session_to_active_model(&session))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await;

        match inserted {
            Ok(()) => {
                debug!("Session {} started", session_id);
                Ok(())
            }
            // 并发请求抢先插入，转为更新
            Err(e) if is_unique_violation(&e) => {
                self.bump_session(session_id, touch).await?;
                Ok(())
            }
            Err(e) => Err(ShepherdError::database_operation(format!(
                "创建会话失败: {}",
                e
            ))),
        }
    }

    async fn bump_session(&self, session_id: &str, touch: &SessionTouch) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("bump_session", self.retry_config, || async {
            let mut update = user_session::Entity::update_many()
                .col_expr(
                    user_session::Column::PageViews,
                    Expr::col(user_session::Column::PageViews).add(Expr::val(1)),
                )
                .col_expr(user_session::Column::LastActivity, Expr::value(Utc::now()));

            if let Some(v) = &touch.user_id {
                update = update.col_expr(user_session::Column::UserId, Expr::value(v.clone()));
            }
            if let Some(v) = &touch.user_agent {
                update = update.col_expr(user_session::Column::UserAgent, Expr::value(v.clone()));
            }
            if let Some(v) = &touch.browser_info {
                update =
                    update.col_expr(user_session::Column::BrowserInfo, Expr::value(json_to_text(v)));
            }
            if let Some(v) = &touch.cookies_data {
                update =
                    update.col_expr(user_session::Column::CookiesData, Expr::value(json_to_text(v)));
            }
            if let Some(v) = &touch.referrer {
                update = update.col_expr(user_session::Column::Referrer, Expr::value(v.clone()));
            }
            if let Some(v) = &touch.device_type {
                update = update.col_expr(user_session::Column::DeviceType, Expr::value(v.clone()));
            }
            if let Some(v) = &touch.screen_resolution {
                update = update.col_expr(
                    user_session::Column::ScreenResolution,
                    Expr::value(v.clone()),
                );
            }
            if let Some(v) = &touch.ip_address {
                update = update.col_expr(user_session::Column::IpAddress, Expr::value(v.clone()));
            }

            update
                .filter(user_session::Column::SessionId.eq(session_id))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("更新会话失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn find_session(&self, session_id: &str) -> Result<Option<UserSession>> {
        let db = &self.db;

        let model = retry::with_retry("find_session", self.retry_config, || async {
            user_session::Entity::find()
                .filter(user_session::Column::SessionId.eq(session_id))
                .one(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询会话失败: {}", e)))?;

        Ok(model.map(model_to_session))
    }

    /// 最近活跃的会话
    pub async fn list_recent_sessions(&self, limit: u64) -> Result<Vec<UserSession>> {
        let db = &self.db;

        let models = retry::with_retry("list_recent_sessions", self.retry_config, || async {
            user_session::Entity::find()
                .order_by_desc(user_session::Column::LastActivity)
                .limit(limit)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询会话列表失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_session).collect())
    }

    pub async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> Result<Vec<UserSession>> {
        let db = &self.db;

        let models = retry::with_retry("list_sessions_for_user", self.retry_config, || async {
            user_session::Entity::find()
                .filter(user_session::Column::UserId.eq(user_id))
                .order_by_desc(user_session::Column::LastActivity)
                .limit(limit)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询用户会话失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_session).collect())
    }
}
