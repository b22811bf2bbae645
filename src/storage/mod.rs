use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;
pub mod scope;

pub use backend::{LinkSearch, SeaOrmStorage, TrashContents};
pub use models::{
    CollectionKind, CollectionWrite, EntityKind, Link, LinkDetails, LinkList, LinkOrder,
    LinkStatus, LinkWrite, PageRequest, Paginated, Tag, TagRef, User,
};
pub use scope::{OwnerScope, TrashFilter};

pub struct StorageFactory;

impl StorageFactory {
    /// 使用配置中的 database_url 创建存储
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        Self::connect(&config.database.database_url).await
    }

    /// 连接指定 URL 并运行迁移
    pub async fn connect(database_url: &str) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;
        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
