//! Service layer
//!
//! HTTP 处理器、CLI 和定时任务共用的业务逻辑，全部以 `Arc` 共享。

pub mod collection_service;
pub mod link_service;
pub mod settings_service;
pub mod trash_service;
pub mod user_service;

use std::sync::Arc;

use crate::storage::SeaOrmStorage;

pub use collection_service::{
    Collection, CollectionInput, CollectionService, ListService, TagService,
};
pub use link_service::{LinkCreated, LinkInput, LinkService};
pub use settings_service::{SettingsService, UserSettings};
pub use trash_service::TrashService;
pub use user_service::UserService;

/// 所有服务的集合，作为 `web::Data` 注入
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub links: Arc<LinkService>,
    pub lists: Arc<ListService>,
    pub tags: Arc<TagService>,
    pub settings: Arc<SettingsService>,
    pub trash: Arc<TrashService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let settings = Arc::new(SettingsService::new(storage.clone()));
        Self {
            links: Arc::new(LinkService::new(storage.clone(), settings.clone())),
            lists: Arc::new(ListService::new(storage.clone(), settings.clone())),
            tags: Arc::new(TagService::new(storage.clone(), settings.clone())),
            trash: Arc::new(TrashService::new(storage.clone())),
            users: Arc::new(UserService::new(storage.clone())),
            settings,
            storage,
        }
    }
}
