//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod collections;
mod connection;
mod converters;
mod links;
mod paging;
pub mod relations;
pub mod retry;
pub mod search;
mod settings;
mod trash;
mod users;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::errors::{LinkaceError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_link, model_to_list, model_to_tag, model_to_user};
pub use links::normalize_url;
pub use relations::{EdgeDiff, diff_edges};
pub use retry::RetryPolicy;
pub use search::LinkSearch;
pub use trash::TrashContents;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkaceError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry: RetryPolicy,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkaceError::database_config("database_url 未设置"));
        }

        let config = crate::config::get_config();
        let retry = RetryPolicy::from_config(&config.database);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(
                database_url,
                backend_name,
                config.database.pool_size,
                config.database.timeout,
            )
            .await?
        };

        run_migrations(&db).await?;

        warn!("{} Storage initialized.", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name: backend_name.to_string(),
            retry,
        })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
