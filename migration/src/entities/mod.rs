pub mod account;
pub mod advertisement;
pub mod report;
pub mod short_link;
pub mod site_settings;
pub mod user_session;

pub use account::Entity as AccountEntity;
pub use advertisement::Entity as AdvertisementEntity;
pub use report::Entity as ReportEntity;
pub use short_link::Entity as ShortLinkEntity;
pub use site_settings::Entity as SiteSettingsEntity;
pub use user_session::Entity as UserSessionEntity;
