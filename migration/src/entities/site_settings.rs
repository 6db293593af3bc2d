use sea_orm::entity::prelude::*;

/// 单行表，id 固定为 1
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub adsense_client_id: Option<String>,
    pub adsense_timer_slot: Option<String>,
    pub adsense_ad_slot: Option<String>,
    pub adsense_enabled: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
