//! 短链接的读写操作

use sea_orm::{
    ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::{link_to_active_model, model_to_link};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::{LinkState, LinkStats, RedirectMode, ShortLink};

use migration::entities::short_link;

/// DSL 聚合查询结果
#[derive(Debug, FromQueryResult)]
struct StatsRow {
    total_links: i64,
    total_clicks: Option<i64>,
    active_links: Option<i64>,
}

/// 链接可修改字段
#[derive(Debug, Clone)]
pub struct LinkChanges {
    pub destination: String,
    pub title: Option<String>,
    pub mode: RedirectMode,
    pub state: LinkState,
}

impl SeaOrmStorage {
    /// 插入新链接，短码已存在时返回 Conflict
    pub async fn insert_link(&self, link: &ShortLink) -> Result<()> {
        let db = &self.db;

        retry::with_retry(
            &format!("insert_link({})", link.code),
            self.retry_config,
            || async {
                short_link::Entity::insert(link_to_active_model(link))
                    .exec(db)
                    .await
                    .map(|_| ())
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ShepherdError::conflict(format!("Short code '{}' is already taken", link.code))
            } else {
                ShepherdError::database_operation(format!("创建短链接失败: {}", e))
            }
        })?;

        info!("Short link created: {}", link.code);
        Ok(())
    }

    pub async fn find_link_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("find_link_by_code({})", code),
            self.retry_config,
            || async {
                short_link::Entity::find()
                    .filter(short_link::Column::ShortCode.eq(code))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    pub async fn find_link_by_id(&self, id: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;

        let model = retry::with_retry("find_link_by_id", self.retry_config, || async {
            short_link::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    /// 短码是否已被占用（包括已删除的链接，短码不复用）
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let db = &self.db;

        let count = retry::with_retry("code_exists", self.retry_config, || async {
            short_link::Entity::find()
                .filter(short_link::Column::ShortCode.eq(code))
                .count(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("检查短码失败: {}", e)))?;

        Ok(count > 0)
    }

    /// 某用户的链接（不含已删除），按创建时间倒序
    pub async fn list_links_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>> {
        let db = &self.db;

        let models = retry::with_retry("list_links_by_owner", self.retry_config, || async {
            short_link::Entity::find()
                .filter(short_link::Column::OwnerId.eq(owner_id))
                .filter(short_link::Column::Status.ne(LinkState::Removed.to_string()))
                .order_by_desc(short_link::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询用户链接失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 所有链接，可按状态过滤，按创建时间倒序
    pub async fn list_links(&self, state: Option<LinkState>) -> Result<Vec<ShortLink>> {
        let db = &self.db;

        let models = retry::with_retry("list_links", self.retry_config, || async {
            let mut query = short_link::Entity::find();
            if let Some(state) = state {
                query = query.filter(short_link::Column::Status.eq(state.to_string()));
            }
            query
                .order_by_desc(short_link::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询链接列表失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 保存可修改字段，返回是否有行被更新
    pub async fn save_link(&self, id: &str, changes: &LinkChanges) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("save_link", self.retry_config, || async {
            short_link::Entity::update_many()
                .col_expr(
                    short_link::Column::OriginalUrl,
                    Expr::value(changes.destination.clone()),
                )
                .col_expr(short_link::Column::Title, Expr::value(changes.title.clone()))
                .col_expr(
                    short_link::Column::RedirectMode,
                    Expr::value(changes.mode.to_string()),
                )
                .col_expr(
                    short_link::Column::Status,
                    Expr::value(changes.state.to_string()),
                )
                .filter(short_link::Column::Id.eq(id))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("更新短链接失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_link_state(&self, id: &str, state: LinkState) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("set_link_state", self.retry_config, || async {
            short_link::Entity::update_many()
                .col_expr(short_link::Column::Status, Expr::value(state.to_string()))
                .filter(short_link::Column::Id.eq(id))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("更新链接状态失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Link {} state changed to {}", id, state);
        }
        Ok(result.rows_affected > 0)
    }

    /// 原子递增点击数（click_count = click_count + 1）
    pub async fn increment_clicks(&self, id: &str) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("increment_clicks", self.retry_config, || async {
            short_link::Entity::update_many()
                .col_expr(
                    short_link::Column::ClickCount,
                    Expr::col(short_link::Column::ClickCount).add(Expr::val(1)),
                )
                .filter(short_link::Column::Id.eq(id))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("更新点击数失败: {}", e)))?;

        debug!("Click recorded for link {}", id);
        Ok(result.rows_affected > 0)
    }

    /// 链接统计（不含已删除）
    pub async fn link_stats(&self) -> Result<LinkStats> {
        let db = &self.db;

        let row = retry::with_retry("link_stats", self.retry_config, || async {
            short_link::Entity::find()
                .select_only()
                .column_as(short_link::Column::Id.count(), "total_links")
                .column_as(short_link::Column::ClickCount.sum(), "total_clicks")
                .column_as(
                    Expr::case(
                        short_link::Column::Status.eq(LinkState::Active.to_string()),
                        1,
                    )
                    .finally(0)
                    .sum(),
                    "active_links",
                )
                .filter(short_link::Column::Status.ne(LinkState::Removed.to_string()))
                .into_model::<StatsRow>()
                .one(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("统计查询失败: {}", e)))?;

        Ok(match row {
            Some(stats) => LinkStats {
                total_links: u64::try_from(stats.total_links).unwrap_or(0),
                active_links: u64::try_from(stats.active_links.unwrap_or(0)).unwrap_or(0),
                total_clicks: u64::try_from(stats.total_clicks.unwrap_or(0)).unwrap_or(0),
            },
            None => LinkStats::default(),
        })
    }

    /// 链接总数（含所有状态，健康检查使用）
    pub async fn count_links(&self) -> Result<u64> {
        let db = &self.db;

        retry::with_retry("count_links", self.retry_config, || async {
            short_link::Entity::find().count(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("统计链接总数失败: {}", e)))
    }
}
