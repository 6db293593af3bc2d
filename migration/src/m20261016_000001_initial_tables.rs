use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // short_links：short_code 全局唯一（包括 removed 状态）
        manager
            .create_table(
                Table::create()
                    .table(ShortLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLink::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShortLink::ShortCode)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ShortLink::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(ShortLink::Title).string().null())
                    .col(
                        ColumnDef::new(ShortLink::RedirectMode)
                            .string_len(16)
                            .not_null()
                            .default("immediate"),
                    )
                    .col(ColumnDef::new(ShortLink::OwnerId).string_len(36).null())
                    .col(
                        ColumnDef::new(ShortLink::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShortLink::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(ShortLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_owner")
                    .table(ShortLink::Table)
                    .col(ShortLink::OwnerId)
                    .col(ShortLink::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // accounts
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Account::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Account::PasswordHash).string().null())
                    .col(ColumnDef::new(Account::FullName).string().null())
                    .col(ColumnDef::new(Account::GoogleId).string().null())
                    .col(
                        ColumnDef::new(Account::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Account::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_accounts_google_id")
                    .table(Account::Table)
                    .col(Account::GoogleId)
                    .to_owned(),
            )
            .await?;

        // reports
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::LinkId).string_len(36).not_null())
                    .col(ColumnDef::new(Report::LinkCode).string_len(64).not_null())
                    .col(ColumnDef::new(Report::ReporterEmail).string().not_null())
                    .col(ColumnDef::new(Report::Reason).string().not_null())
                    .col(ColumnDef::new(Report::Description).text().null())
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Report::AdminResponse).text().null())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Report::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reports_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // user_sessions
        manager
            .create_table(
                Table::create()
                    .table(UserSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSession::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSession::SessionId)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserSession::UserId).string_len(36).null())
                    .col(ColumnDef::new(UserSession::UserAgent).text().null())
                    .col(ColumnDef::new(UserSession::BrowserInfo).text().null())
                    .col(ColumnDef::new(UserSession::CookiesData).text().null())
                    .col(ColumnDef::new(UserSession::Referrer).text().null())
                    .col(ColumnDef::new(UserSession::DeviceType).string_len(32).null())
                    .col(
                        ColumnDef::new(UserSession::ScreenResolution)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(UserSession::IpAddress).string_len(64).null())
                    .col(
                        ColumnDef::new(UserSession::PageViews)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(UserSession::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_sessions_last_activity")
                    .table(UserSession::Table)
                    .col(UserSession::LastActivity)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_sessions_user")
                    .table(UserSession::Table)
                    .col(UserSession::UserId)
                    .to_owned(),
            )
            .await?;

        // advertisements
        manager
            .create_table(
                Table::create()
                    .table(Advertisement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Advertisement::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Advertisement::OwnerId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Advertisement::Title).string().not_null())
                    .col(ColumnDef::new(Advertisement::Description).text().null())
                    .col(ColumnDef::new(Advertisement::ImageUrl).text().not_null())
                    .col(ColumnDef::new(Advertisement::TargetUrl).text().null())
                    .col(
                        ColumnDef::new(Advertisement::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Advertisement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_advertisements_active")
                    .table(Advertisement::Table)
                    .col(Advertisement::IsActive)
                    .to_owned(),
            )
            .await?;

        // site_settings（单行）
        manager
            .create_table(
                Table::create()
                    .table(SiteSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SiteSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SiteSettings::AdsenseClientId).string().null())
                    .col(
                        ColumnDef::new(SiteSettings::AdsenseTimerSlot)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(SiteSettings::AdsenseAdSlot).string().null())
                    .col(
                        ColumnDef::new(SiteSettings::AdsenseEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SiteSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Advertisement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSession::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    Id,
    ShortCode,
    OriginalUrl,
    Title,
    RedirectMode,
    OwnerId,
    ClickCount,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    GoogleId,
    Role,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Report {
    #[sea_orm(iden = "reports")]
    Table,
    Id,
    LinkId,
    LinkCode,
    ReporterEmail,
    Reason,
    Description,
    Status,
    AdminResponse,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserSession {
    #[sea_orm(iden = "user_sessions")]
    Table,
    Id,
    SessionId,
    UserId,
    UserAgent,
    BrowserInfo,
    CookiesData,
    Referrer,
    DeviceType,
    ScreenResolution,
    IpAddress,
    PageViews,
    LastActivity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Advertisement {
    #[sea_orm(iden = "advertisements")]
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    ImageUrl,
    TargetUrl,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SiteSettings {
    #[sea_orm(iden = "site_settings")]
    Table,
    Id,
    AdsenseClientId,
    AdsenseTimerSlot,
    AdsenseAdSlot,
    AdsenseEnabled,
    UpdatedAt,
}
