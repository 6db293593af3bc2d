use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};
use tracing::info;

use super::converters::{advertisement_to_active_model, model_to_advertisement};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::Advertisement;

use migration::entities::advertisement;

impl SeaOrmStorage {
    pub async fn insert_advertisement(&self, ad: &Advertisement) -> Result<()> {
        let db = &self.db;

        retry::with_retry("insert_advertisement", self.retry_config, || async {
            advertisement::Entity::insert(advertisement_to_active_model(ad))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("创建广告失败: {}", e)))?;

        info!("Advertisement created: {}", ad.id);
        Ok(())
    }

    pub async fn find_advertisement(&self, id: &str) -> Result<Option<Advertisement>> {
        let db = &self.db;

        let model = retry::with_retry("find_advertisement", self.retry_config, || async {
            advertisement::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询广告失败: {}", e)))?;

        Ok(model.map(model_to_advertisement))
    }

    pub async fn list_advertisements_by_owner(&self, owner_id: &str) -> Result<Vec<Advertisement>> {
        let db = &self.db;

        let models = retry::with_retry("list_advertisements_by_owner", self.retry_config, || async {
            advertisement::Entity::find()
                .filter(advertisement::Column::OwnerId.eq(owner_id))
                .order_by_desc(advertisement::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询广告列表失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_advertisement).collect())
    }

    pub async fn set_advertisement_active(&self, id: &str, active: bool) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("set_advertisement_active", self.retry_config, || async {
            advertisement::Entity::update_many()
                .col_expr(advertisement::Column::IsActive, Expr::value(active))
                .filter(advertisement::Column::Id.eq(id))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("更新广告状态失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_advertisement(&self, id: &str) -> Result<bool> {
        let db = &self.db;

        let result = retry::with_retry("delete_advertisement", self.retry_config, || async {
            advertisement::Entity::delete_by_id(id).exec(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("删除广告失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Advertisement deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// 随机取一条启用中的广告
    pub async fn random_active_advertisement(&self) -> Result<Option<Advertisement>> {
        let db = &self.db;

        let total = retry::with_retry("count_active_advertisements", self.retry_config, || async {
            advertisement::Entity::find()
                .filter(advertisement::Column::IsActive.eq(true))
                .count(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("统计广告失败: {}", e)))?;

        if total == 0 {
            return Ok(None);
        }

        let offset = rand::random_range(0..total);
        let model = retry::with_retry("random_active_advertisement", self.retry_config, || async {
            advertisement::Entity::find()
                .filter(advertisement::Column::IsActive.eq(true))
                .order_by_asc(advertisement::Column::Id)
                .offset(offset)
                .limit(1)
                .one(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询广告失败: {}", e)))?;

        Ok(model.map(model_to_advertisement))
    }
}
