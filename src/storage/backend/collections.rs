//! 列表与标签的读写
//!
//! 两者结构相同：名称在同一用户的未删除记录中唯一，支持私有标记和软删除。

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::info;

use migration::entities::{link_list, tag};

use super::SeaOrmStorage;
use super::converters::{model_to_list, model_to_tag};
use crate::errors::{LinkaceError, Result};
use crate::storage::models::{CollectionWrite, LinkList, PageRequest, Paginated, Tag};
use crate::storage::scope::{NamedEntity, OwnerScope, TrashFilter, scoped};

/// 名称是否已被该用户的其他未删除记录占用
pub(super) async fn name_taken<E, C>(conn: &C, user_id: i32, name: &str, except_id: Option<i32>) -> Result<bool>
where
    E: NamedEntity,
    C: ConnectionTrait,
{
    let mut select = E::find()
        .select_only()
        .column(E::id_column())
        .filter(scoped::<E>(OwnerScope::User(user_id), TrashFilter::Exclude))
        .filter(E::name_column().eq(name));
    if let Some(id) = except_id {
        select = select.filter(E::id_column().ne(id));
    }
    let existing: Option<i32> = select.into_tuple().one(conn).await?;
    Ok(existing.is_some())
}

pub(super) fn name_taken_error() -> LinkaceError {
    LinkaceError::validation("name", "The name has already been taken.")
}

impl SeaOrmStorage {
    // ========== 列表 ==========

    pub async fn find_list(
        &self,
        scope: OwnerScope,
        id: i32,
        trash: TrashFilter,
    ) -> Result<Option<LinkList>> {
        let model = link_list::Entity::find_by_id(id)
            .filter(scoped::<link_list::Entity>(scope, trash))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_list))
    }

    /// 全部未删除列表（按名称排序，用于下拉选择和 API）
    pub async fn all_lists(&self, scope: OwnerScope) -> Result<Vec<LinkList>> {
        let models = link_list::Entity::find()
            .filter(scoped::<link_list::Entity>(scope, TrashFilter::Exclude))
            .order_by_asc(link_list::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_list).collect())
    }

    pub async fn paginate_lists(
        &self,
        scope: OwnerScope,
        page: PageRequest,
    ) -> Result<Paginated<LinkList>> {
        let select = link_list::Entity::find()
            .filter(scoped::<link_list::Entity>(scope, TrashFilter::Exclude))
            .order_by_asc(link_list::Column::Name)
            .order_by_asc(link_list::Column::Id);
        self.fetch_page("paginate_lists", select, page, model_to_list)
            .await
    }

    pub async fn create_list(&self, user_id: i32, write: &CollectionWrite) -> Result<LinkList> {
        if name_taken::<link_list::Entity, _>(&self.db, user_id, &write.name, None).await? {
            return Err(name_taken_error());
        }

        let now = Utc::now();
        let model = link_list::ActiveModel {
            user_id: Set(user_id),
            name: Set(write.name.clone()),
            description: Set(write.description.clone()),
            is_private: Set(write.is_private),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("List {} created for user {}", model.id, user_id);
        Ok(model_to_list(model))
    }

    pub async fn update_list(
        &self,
        user_id: i32,
        id: i32,
        write: &CollectionWrite,
    ) -> Result<LinkList> {
        let existing = link_list::Entity::find_by_id(id)
            .filter(scoped::<link_list::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("List {} not found", id)))?;

        if name_taken::<link_list::Entity, _>(&self.db, user_id, &write.name, Some(id)).await? {
            return Err(name_taken_error());
        }

        let mut active = existing.into_active_model();
        active.name = Set(write.name.clone());
        active.description = Set(write.description.clone());
        active.is_private = Set(write.is_private);
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await?;
        Ok(model_to_list(model))
    }

    // ========== 标签 ==========

    pub async fn find_tag(
        &self,
        scope: OwnerScope,
        id: i32,
        trash: TrashFilter,
    ) -> Result<Option<Tag>> {
        let model = tag::Entity::find_by_id(id)
            .filter(scoped::<tag::Entity>(scope, trash))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_tag))
    }

    pub async fn all_tags(&self, scope: OwnerScope) -> Result<Vec<Tag>> {
        let models = tag::Entity::find()
            .filter(scoped::<tag::Entity>(scope, TrashFilter::Exclude))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_tag).collect())
    }

    pub async fn paginate_tags(&self, scope: OwnerScope, page: PageRequest) -> Result<Paginated<Tag>> {
        let select = tag::Entity::find()
            .filter(scoped::<tag::Entity>(scope, TrashFilter::Exclude))
            .order_by_asc(tag::Column::Name)
            .order_by_asc(tag::Column::Id);
        self.fetch_page("paginate_tags", select, page, model_to_tag)
            .await
    }

    pub async fn create_tag(&self, user_id: i32, write: &CollectionWrite) -> Result<Tag> {
        if name_taken::<tag::Entity, _>(&self.db, user_id, &write.name, None).await? {
            return Err(name_taken_error());
        }

        let now = Utc::now();
        let model = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(write.name.clone()),
            is_private: Set(write.is_private),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Tag {} created for user {}", model.id, user_id);
        Ok(model_to_tag(model))
    }

    pub async fn update_tag(&self, user_id: i32, id: i32, write: &CollectionWrite) -> Result<Tag> {
        let existing = tag::Entity::find_by_id(id)
            .filter(scoped::<tag::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("Tag {} not found", id)))?;

        if name_taken::<tag::Entity, _>(&self.db, user_id, &write.name, Some(id)).await? {
            return Err(name_taken_error());
        }

        let mut active = existing.into_active_model();
        active.name = Set(write.name.clone());
        active.is_private = Set(write.is_private);
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await?;
        Ok(model_to_tag(model))
    }
}
