use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{Result, ShepherdError};
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite 数据库（不存在时自动创建，开启 WAL）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    // 内存库每个连接各自独立，只能用单连接
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_size = if in_memory {
        1
    } else {
        crate::config::get_config().database.pool_size
    };

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ShepherdError::database_config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .foreign_keys(true);

    let pool = sqlite_pool_options(pool_size)
        .connect_with(opt)
        .await
        .map_err(|e| {
            ShepherdError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// SQLite 连接池参数，连接数取 `database.pool_size`
fn sqlite_pool_options(pool_size: u32) -> sea_orm::sqlx::sqlite::SqlitePoolOptions {
    sea_orm::sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(pool_size.max(1))
        .acquire_timeout(std::time::Duration::from_secs(8))
        .idle_timeout(std::time::Duration::from_secs(300))
}

/// 连接 MySQL / PostgreSQL
pub async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    let pool_size = crate::config::get_config().database.pool_size;

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(2))
        .connect_timeout(std::time::Duration::from_secs(8))
        .acquire_timeout(std::time::Duration::from_secs(8))
        .idle_timeout(std::time::Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        ShepherdError::database_connection(format!(
            "无法连接到 {} 数据库: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ShepherdError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_pool_honors_pool_size() {
        assert_eq!(sqlite_pool_options(4).get_max_connections(), 4);
        assert_eq!(sqlite_pool_options(0).get_max_connections(), 1);
    }
}
