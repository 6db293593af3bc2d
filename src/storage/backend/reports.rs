use sea_orm::{EntityTrait, QueryOrder};
use tracing::info;

use super::converters::{model_to_report, report_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::Report;

use migration::entities::report;

impl SeaOrmStorage {
    pub async fn insert_report(&self, rep: &Report) -> Result<()> {
        let db = &self.db;

        retry::with_retry("insert_report", self.retry_config, || async {
            report::Entity::insert(report_to_active_model(rep))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("创建举报失败: {}", e)))?;

        info!("Report {} filed against link {}", rep.id, rep.link_code);
        Ok(())
    }

    pub async fn find_report(&self, id: &str) -> Result<Option<Report>> {
        let db = &self.db;

        let model = retry::with_retry("find_report", self.retry_config, || async {
            report::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询举报失败: {}", e)))?;

        Ok(model.map(model_to_report))
    }

    pub async fn update_report(&self, rep: &Report) -> Result<()> {
        let db = &self.db;

        retry::with_retry("update_report", self.retry_config, || async {
            report::Entity::update(report_to_active_model(rep))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                ShepherdError::not_found(format!("Report '{}' not found", rep.id))
            }
            e => ShepherdError::database_operation(format!("更新举报失败: {}", e)),
        })
    }

    /// 全部举报，最新在前
    pub async fn list_reports(&self) -> Result<Vec<Report>> {
        let db = &self.db;

        let models = retry::with_retry("list_reports", self.retry_config, || async {
            report::Entity::find()
                .order_by_desc(report::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询举报列表失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_report).collect())
    }
}
