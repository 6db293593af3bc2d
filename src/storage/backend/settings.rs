use sea_orm::{EntityTrait, sea_query::OnConflict};

use super::converters::{SITE_SETTINGS_ID, model_to_settings, settings_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::SiteSettings;

use migration::entities::site_settings;

impl SeaOrmStorage {
    /// 读取站点设置，尚未保存过时返回 None
    pub async fn get_site_settings(&self) -> Result<Option<SiteSettings>> {
        let db = &self.db;

        let model = retry::with_retry("get_site_settings", self.retry_config, || async {
            site_settings::Entity::find_by_id(SITE_SETTINGS_ID).one(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("读取站点设置失败: {}", e)))?;

        Ok(model.map(model_to_settings))
    }

    pub async fn upsert_site_settings(&self, settings: &SiteSettings) -> Result<()> {
        let db = &self.db;

        retry::with_retry("upsert_site_settings", self.retry_config, || async {
            site_settings::Entity::insert(settings_to_active_model(settings))
                .on_conflict(
                    OnConflict::column(site_settings::Column::Id)
                        .update_columns([
                            site_settings::Column::AdsenseClientId,
                            site_settings::Column::AdsenseTimerSlot,
                            site_settings::Column::AdsenseAdSlot,
                            site_settings::Column::AdsenseEnabled,
                            site_settings::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("保存站点设置失败: {}", e)))
    }
}
