use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::errors::Result;
use crate::storage::{SeaOrmStorage, SiteSettings};

/// 部分更新；`Some("")` 清空对应字段
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub adsense_client_id: Option<String>,
    pub adsense_timer_slot: Option<String>,
    pub adsense_ad_slot: Option<String>,
    pub adsense_enabled: Option<bool>,
}

fn apply(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim().to_string();
        *slot = if v.is_empty() { None } else { Some(v) };
    }
}

pub struct SettingsService {
    storage: Arc<SeaOrmStorage>,
}

impl SettingsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 读取站点设置，不存在时写入默认值
    pub async fn get(&self) -> Result<SiteSettings> {
        if let Some(settings) = self.storage.get_site_settings().await? {
            return Ok(settings);
        }
        let defaults = SiteSettings::default();
        self.storage.upsert_site_settings(&defaults).await?;
        Ok(defaults)
    }

    pub async fn update(&self, update: SettingsUpdate) -> Result<SiteSettings> {
        let mut settings = self.get().await?;

        apply(&mut settings.adsense_client_id, update.adsense_client_id);
        apply(&mut settings.adsense_timer_slot, update.adsense_timer_slot);
        apply(&mut settings.adsense_ad_slot, update.adsense_ad_slot);
        if let Some(enabled) = update.adsense_enabled {
            settings.adsense_enabled = enabled;
        }
        settings.updated_at = Utc::now();

        self.storage.upsert_site_settings(&settings).await?;
        info!("Site settings updated (adsense_enabled={})", settings.adsense_enabled);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_values() {
        let mut slot = Some("old".to_string());
        apply(&mut slot, None);
        assert_eq!(slot.as_deref(), Some("old"));

        apply(&mut slot, Some(" new ".to_string()));
        assert_eq!(slot.as_deref(), Some("new"));

        apply(&mut slot, Some("".to_string()));
        assert_eq!(slot, None);
    }
}
