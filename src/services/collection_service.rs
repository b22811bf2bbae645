//! 列表和标签服务
//!
//! 两者的生命周期一致，`CollectionService` 按 `Collection` 泛型实现一次。

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::settings_service::{SettingsService, UserSettings};
use crate::errors::{LinkaceError, Result};
use crate::storage::{
    CollectionKind, CollectionWrite, LinkList, OwnerScope, PageRequest, Paginated, SeaOrmStorage,
    Tag, TrashFilter,
};

/// 提交的列表/标签数据；`is_private` 为空时取用户默认值
#[derive(Debug, Clone, Default)]
pub struct CollectionInput {
    pub name: String,
    pub description: Option<String>,
    pub is_private: Option<bool>,
}

impl CollectionInput {
    fn into_write(self, private_default: bool) -> CollectionWrite {
        CollectionWrite {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_private: self.is_private.unwrap_or(private_default),
        }
    }
}

/// 列表和标签共同的存储操作
#[async_trait]
pub trait Collection: Sized + Send + Sync + 'static {
    const KIND: CollectionKind;

    fn id(&self) -> i32;
    fn name(&self) -> &str;
    fn is_private(&self) -> bool;
    fn private_default(settings: &UserSettings) -> bool;

    async fn find(storage: &SeaOrmStorage, scope: OwnerScope, id: i32) -> Result<Option<Self>>;
    async fn all(storage: &SeaOrmStorage, scope: OwnerScope) -> Result<Vec<Self>>;
    async fn paginate(
        storage: &SeaOrmStorage,
        scope: OwnerScope,
        page: PageRequest,
    ) -> Result<Paginated<Self>>;
    async fn insert(storage: &SeaOrmStorage, user_id: i32, write: &CollectionWrite) -> Result<Self>;
    async fn update(
        storage: &SeaOrmStorage,
        user_id: i32,
        id: i32,
        write: &CollectionWrite,
    ) -> Result<Self>;
}

#[async_trait]
impl Collection for LinkList {
    const KIND: CollectionKind = CollectionKind::List;

    fn id(&self) -> i32 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_private(&self) -> bool {
        self.is_private
    }
    fn private_default(settings: &UserSettings) -> bool {
        settings.lists_private_default
    }

    async fn find(storage: &SeaOrmStorage, scope: OwnerScope, id: i32) -> Result<Option<Self>> {
        storage.find_list(scope, id, TrashFilter::Exclude).await
    }
    async fn all(storage: &SeaOrmStorage, scope: OwnerScope) -> Result<Vec<Self>> {
        storage.all_lists(scope).await
    }
    async fn paginate(
        storage: &SeaOrmStorage,
        scope: OwnerScope,
        page: PageRequest,
    ) -> Result<Paginated<Self>> {
        storage.paginate_lists(scope, page).await
    }
    async fn insert(storage: &SeaOrmStorage, user_id: i32, write: &CollectionWrite) -> Result<Self> {
        storage.create_list(user_id, write).await
    }
    async fn update(
        storage: &SeaOrmStorage,
        user_id: i32,
        id: i32,
        write: &CollectionWrite,
    ) -> Result<Self> {
        storage.update_list(user_id, id, write).await
    }
}

#[async_trait]
impl Collection for Tag {
    const KIND: CollectionKind = CollectionKind::Tag;

    fn id(&self) -> i32 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_private(&self) -> bool {
        self.is_private
    }
    fn private_default(settings: &UserSettings) -> bool {
        settings.tags_private_default
    }

    async fn find(storage: &SeaOrmStorage, scope: OwnerScope, id: i32) -> Result<Option<Self>> {
        storage.find_tag(scope, id, TrashFilter::Exclude).await
    }
    async fn all(storage: &SeaOrmStorage, scope: OwnerScope) -> Result<Vec<Self>> {
        storage.all_tags(scope).await
    }
    async fn paginate(
        storage: &SeaOrmStorage,
        scope: OwnerScope,
        page: PageRequest,
    ) -> Result<Paginated<Self>> {
        storage.paginate_tags(scope, page).await
    }
    async fn insert(storage: &SeaOrmStorage, user_id: i32, write: &CollectionWrite) -> Result<Self> {
        storage.create_tag(user_id, write).await
    }
    async fn update(
        storage: &SeaOrmStorage,
        user_id: i32,
        id: i32,
        write: &CollectionWrite,
    ) -> Result<Self> {
        storage.update_tag(user_id, id, write).await
    }
}

pub struct CollectionService<C: Collection> {
    storage: Arc<SeaOrmStorage>,
    settings: Arc<SettingsService>,
    _kind: PhantomData<fn() -> C>,
}

pub type ListService = CollectionService<LinkList>;
pub type TagService = CollectionService<Tag>;

impl<C: Collection> CollectionService<C> {
    pub fn new(storage: Arc<SeaOrmStorage>, settings: Arc<SettingsService>) -> Self {
        Self {
            storage,
            settings,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        C::KIND
    }

    pub async fn index(&self, scope: OwnerScope, page: PageRequest) -> Result<Paginated<C>> {
        C::paginate(&self.storage, scope, page).await
    }

    pub async fn all(&self, scope: OwnerScope) -> Result<Vec<C>> {
        C::all(&self.storage, scope).await
    }

    pub async fn show(&self, scope: OwnerScope, id: i32) -> Result<C> {
        C::find(&self.storage, scope, id).await?.ok_or_else(|| {
            LinkaceError::not_found(format!("{} {} not found", C::KIND.label(), id))
        })
    }

    pub async fn create(&self, user_id: i32, input: CollectionInput) -> Result<C> {
        let defaults = self.settings.user_settings(user_id).await?;
        let item = C::insert(
            &self.storage,
            user_id,
            &input.into_write(C::private_default(&defaults)),
        )
        .await?;
        info!(
            "CollectionService: {} {} '{}' created",
            C::KIND.as_ref(),
            item.id(),
            item.name()
        );
        Ok(item)
    }

    /// 未提交 `is_private` 时保留原值
    pub async fn update(&self, user_id: i32, id: i32, input: CollectionInput) -> Result<C> {
        let existing = self.show(OwnerScope::User(user_id), id).await?;
        C::update(
            &self.storage,
            user_id,
            id,
            &input.into_write(existing.is_private()),
        )
        .await
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<()> {
        self.storage.trash(C::KIND.into(), user_id, id).await
    }
}
