//! 软删除、恢复与回收站清理

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::info;

use migration::entities::{link, link_list, link_list_link, link_tag, tag};

use super::SeaOrmStorage;
use super::collections::{name_taken, name_taken_error};
use super::converters::{model_to_link, model_to_list, model_to_tag};
use crate::errors::{LinkaceError, Result};
use crate::storage::models::{EntityKind, Link, LinkList, Tag};
use crate::storage::scope::{NamedEntity, OwnedEntity, OwnerScope, TrashFilter, scoped};

/// 回收站内容
#[derive(Debug, Clone, Default)]
pub struct TrashContents {
    pub links: Vec<Link>,
    pub lists: Vec<LinkList>,
    pub tags: Vec<Tag>,
}

impl TrashContents {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.lists.is_empty() && self.tags.is_empty()
    }
}

/// 设置或清除 deleted_at；from 为当前必须满足的回收站状态
async fn set_deleted_at<E, C>(
    conn: &C,
    user_id: i32,
    id: i32,
    from: TrashFilter,
    value: Option<DateTime<Utc>>,
) -> Result<bool>
where
    E: OwnedEntity,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(E::deleted_at_column(), Expr::value(value))
        .filter(scoped::<E>(OwnerScope::User(user_id), from))
        .filter(E::id_column().eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// 恢复列表或标签：同名的未删除记录已存在时拒绝恢复
async fn restore_named<E, C>(conn: &C, user_id: i32, id: i32) -> Result<bool>
where
    E: NamedEntity,
    C: ConnectionTrait,
{
    let name: Option<String> = E::find()
        .select_only()
        .column(E::name_column())
        .filter(scoped::<E>(OwnerScope::User(user_id), TrashFilter::Only))
        .filter(E::id_column().eq(id))
        .into_tuple()
        .one(conn)
        .await?;
    let Some(name) = name else {
        return Ok(false);
    };
    if name_taken::<E, _>(conn, user_id, &name, Some(id)).await? {
        return Err(name_taken_error());
    }
    set_deleted_at::<E, _>(conn, user_id, id, TrashFilter::Only, None).await
}

/// 删除时间早于 before 的记录 ID
async fn expired_ids<E, C>(conn: &C, before: DateTime<Utc>) -> Result<Vec<i32>>
where
    E: OwnedEntity,
    C: ConnectionTrait,
{
    let ids = E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::deleted_at_column().is_not_null())
        .filter(E::deleted_at_column().lt(before))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids)
}

impl SeaOrmStorage {
    /// 软删除；记录不存在、不属于该用户或已删除时返回 NotFound
    pub async fn trash(&self, kind: EntityKind, user_id: i32, id: i32) -> Result<()> {
        let now = Some(Utc::now());
        let found = match kind {
            EntityKind::Link => {
                set_deleted_at::<link::Entity, _>(&self.db, user_id, id, TrashFilter::Exclude, now)
                    .await?
            }
            EntityKind::List => {
                set_deleted_at::<link_list::Entity, _>(
                    &self.db,
                    user_id,
                    id,
                    TrashFilter::Exclude,
                    now,
                )
                .await?
            }
            EntityKind::Tag => {
                set_deleted_at::<tag::Entity, _>(&self.db, user_id, id, TrashFilter::Exclude, now)
                    .await?
            }
        };
        if !found {
            return Err(LinkaceError::not_found(format!(
                "{} {} not found",
                kind.as_ref(),
                id
            )));
        }
        info!("Trashed {} {} of user {}", kind.as_ref(), id, user_id);
        Ok(())
    }

    /// 从回收站恢复；关系行在删除时保留，恢复后自动生效
    ///
    /// 列表和标签恢复前重新检查名称唯一性。
    pub async fn restore(&self, kind: EntityKind, user_id: i32, id: i32) -> Result<()> {
        let found = match kind {
            EntityKind::Link => {
                set_deleted_at::<link::Entity, _>(&self.db, user_id, id, TrashFilter::Only, None)
                    .await?
            }
            EntityKind::List => {
                let txn = self.db.begin().await?;
                let found = restore_named::<link_list::Entity, _>(&txn, user_id, id).await?;
                txn.commit().await?;
                found
            }
            EntityKind::Tag => {
                let txn = self.db.begin().await?;
                let found = restore_named::<tag::Entity, _>(&txn, user_id, id).await?;
                txn.commit().await?;
                found
            }
        };
        if !found {
            return Err(LinkaceError::not_found(format!(
                "Trashed {} {} not found",
                kind.as_ref(),
                id
            )));
        }
        info!("Restored {} {} of user {}", kind.as_ref(), id, user_id);
        Ok(())
    }

    pub async fn trash_contents(&self, user_id: i32) -> Result<TrashContents> {
        let scope = OwnerScope::User(user_id);

        let links = link::Entity::find()
            .filter(scoped::<link::Entity>(scope, TrashFilter::Only))
            .order_by_desc(link::Column::DeletedAt)
            .all(&self.db)
            .await?;
        let lists = link_list::Entity::find()
            .filter(scoped::<link_list::Entity>(scope, TrashFilter::Only))
            .order_by_desc(link_list::Column::DeletedAt)
            .all(&self.db)
            .await?;
        let tags = tag::Entity::find()
            .filter(scoped::<tag::Entity>(scope, TrashFilter::Only))
            .order_by_desc(tag::Column::DeletedAt)
            .all(&self.db)
            .await?;

        Ok(TrashContents {
            links: links.into_iter().map(model_to_link).collect(),
            lists: lists.into_iter().map(model_to_list).collect(),
            tags: tags.into_iter().map(model_to_tag).collect(),
        })
    }

    /// 永久删除在回收站中超过期限的记录及其关系行，返回删除的记录数
    pub async fn purge_trashed(&self, kind: EntityKind, before: DateTime<Utc>) -> Result<u64> {
        let txn = self.db.begin().await?;

        let deleted = match kind {
            EntityKind::Link => {
                let ids = expired_ids::<link::Entity, _>(&txn, before).await?;
                if ids.is_empty() {
                    return Ok(0);
                }
                link_tag::Entity::delete_many()
                    .filter(link_tag::Column::LinkId.is_in(ids.clone()))
                    .exec(&txn)
                    .await?;
                link_list_link::Entity::delete_many()
                    .filter(link_list_link::Column::LinkId.is_in(ids.clone()))
                    .exec(&txn)
                    .await?;
                link::Entity::delete_many()
                    .filter(link::Column::Id.is_in(ids))
                    .exec(&txn)
                    .await?
                    .rows_affected
            }
            EntityKind::List => {
                let ids = expired_ids::<link_list::Entity, _>(&txn, before).await?;
                if ids.is_empty() {
                    return Ok(0);
                }
                link_list_link::Entity::delete_many()
                    .filter(link_list_link::Column::ListId.is_in(ids.clone()))
                    .exec(&txn)
                    .await?;
                link_list::Entity::delete_many()
                    .filter(link_list::Column::Id.is_in(ids))
                    .exec(&txn)
                    .await?
                    .rows_affected
            }
            EntityKind::Tag => {
                let ids = expired_ids::<tag::Entity, _>(&txn, before).await?;
                if ids.is_empty() {
                    return Ok(0);
                }
                link_tag::Entity::delete_many()
                    .filter(link_tag::Column::TagId.is_in(ids.clone()))
                    .exec(&txn)
                    .await?;
                tag::Entity::delete_many()
                    .filter(tag::Column::Id.is_in(ids))
                    .exec(&txn)
                    .await?
                    .rows_affected
            }
        };

        txn.commit().await?;
        if deleted > 0 {
            info!("Purged {} trashed {} records", deleted, kind.as_ref());
        }
        Ok(deleted)
    }
}
