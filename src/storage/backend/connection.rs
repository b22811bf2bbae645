use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{LinkaceError, Result};
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite 数据库（自动创建文件，WAL 模式）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkaceError::database_config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .pragma("temp_store", "memory");

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        LinkaceError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL/PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    pool_size: u32,
    timeout_secs: u64,
) -> Result<DatabaseConnection> {
    // sqlx 只识别 mysql:// 前缀
    let url = match database_url.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => database_url.to_owned(),
    };

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(2))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .acquire_timeout(Duration::from_secs(timeout_secs))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkaceError::database_connection(format!(
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
        .map_err(|e| LinkaceError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
