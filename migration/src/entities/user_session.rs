use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub session_id: String,
    pub user_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    /// JSON 文本
    #[sea_orm(column_type = "Text", nullable)]
    pub browser_info: Option<String>,
    /// JSON 文本
    #[sea_orm(column_type = "Text", nullable)]
    pub cookies_data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub screen_resolution: Option<String>,
    pub ip_address: Option<String>,
    pub page_views: i64,
    pub last_activity: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
