//! 链接与标签/列表之间的关系同步
//!
//! 同步被拆成两步：纯函数 `diff_edges` 计算要插入和删除的边，
//! 执行器在调用方的事务里落库，不动未变化的边。

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use tracing::debug;

use migration::entities::{link_list, link_list_link, link_tag, tag};

use crate::errors::{LinkaceError, Result};
use crate::storage::models::TagRef;
use crate::storage::scope::{OwnedEntity, OwnerScope, TrashFilter, scoped};

/// 关系差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDiff {
    pub insert: BTreeSet<i32>,
    pub remove: BTreeSet<i32>,
}

impl EdgeDiff {
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.remove.is_empty()
    }
}

/// 计算从 current 变为 desired 需要的增删
pub fn diff_edges(current: &BTreeSet<i32>, desired: &BTreeSet<i32>) -> EdgeDiff {
    EdgeDiff {
        insert: desired.difference(current).copied().collect(),
        remove: current.difference(desired).copied().collect(),
    }
}

/// 关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Tags,
    Lists,
}

impl Edge {
    /// 表单字段名，校验错误挂在这个字段上
    pub fn field(self) -> &'static str {
        match self {
            Edge::Tags => "tags",
            Edge::Lists => "lists",
        }
    }
}

pub async fn current_edges<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    link_id: i32,
) -> std::result::Result<BTreeSet<i32>, DbErr> {
    let ids: Vec<i32> = match edge {
        Edge::Tags => {
            link_tag::Entity::find()
                .select_only()
                .column(link_tag::Column::TagId)
                .filter(link_tag::Column::LinkId.eq(link_id))
                .into_tuple()
                .all(conn)
                .await?
        }
        Edge::Lists => {
            link_list_link::Entity::find()
                .select_only()
                .column(link_list_link::Column::ListId)
                .filter(link_list_link::Column::LinkId.eq(link_id))
                .into_tuple()
                .all(conn)
                .await?
        }
    };
    Ok(ids.into_iter().collect())
}

/// 把链接的边替换为 desired，返回实际执行的差异
pub async fn sync_edges<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    link_id: i32,
    desired: &BTreeSet<i32>,
) -> std::result::Result<EdgeDiff, DbErr> {
    let current = current_edges(conn, edge, link_id).await?;
    let diff = diff_edges(&current, desired);

    if !diff.remove.is_empty() {
        let removed: Vec<i32> = diff.remove.iter().copied().collect();
        match edge {
            Edge::Tags => {
                link_tag::Entity::delete_many()
                    .filter(link_tag::Column::LinkId.eq(link_id))
                    .filter(link_tag::Column::TagId.is_in(removed))
                    .exec(conn)
                    .await?;
            }
            Edge::Lists => {
                link_list_link::Entity::delete_many()
                    .filter(link_list_link::Column::LinkId.eq(link_id))
                    .filter(link_list_link::Column::ListId.is_in(removed))
                    .exec(conn)
                    .await?;
            }
        }
    }

    if !diff.insert.is_empty() {
        match edge {
            Edge::Tags => {
                let rows = diff.insert.iter().map(|&tag_id| link_tag::ActiveModel {
                    link_id: Set(link_id),
                    tag_id: Set(tag_id),
                });
                link_tag::Entity::insert_many(rows)
                    .exec_without_returning(conn)
                    .await?;
            }
            Edge::Lists => {
                let rows = diff.insert.iter().map(|&list_id| link_list_link::ActiveModel {
                    link_id: Set(link_id),
                    list_id: Set(list_id),
                });
                link_list_link::Entity::insert_many(rows)
                    .exec_without_returning(conn)
                    .await?;
            }
        }
    }

    debug!(
        "Synced {:?} for link {}: +{} -{}",
        edge,
        link_id,
        diff.insert.len(),
        diff.remove.len()
    );
    Ok(diff)
}

/// 在 ids 中筛出属于该用户且未删除的记录
async fn owned_ids<E, C>(conn: &C, user_id: i32, ids: &BTreeSet<i32>) -> Result<BTreeSet<i32>>
where
    E: OwnedEntity,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }
    let found: Vec<i32> = E::find()
        .select_only()
        .column(E::id_column())
        .filter(scoped::<E>(OwnerScope::User(user_id), TrashFilter::Exclude))
        .filter(E::id_column().is_in(ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(found.into_iter().collect())
}

/// 校验列表 ID 全部属于该用户
pub async fn resolve_list_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    ids: &[i32],
) -> Result<BTreeSet<i32>> {
    let wanted: BTreeSet<i32> = ids.iter().copied().collect();
    let owned = owned_ids::<link_list::Entity, C>(conn, user_id, &wanted).await?;
    if owned != wanted {
        return Err(LinkaceError::validation(
            Edge::Lists.field(),
            "The selected lists are invalid.",
        ));
    }
    Ok(owned)
}

/// 解析标签引用：ID 必须属于该用户，名称不存在时新建
pub async fn resolve_tag_refs<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    refs: &[TagRef],
    new_tags_private: bool,
) -> Result<BTreeSet<i32>> {
    let mut wanted_ids = BTreeSet::new();
    let mut names = BTreeSet::new();
    for r in refs {
        match r {
            TagRef::Id(id) => {
                wanted_ids.insert(*id);
            }
            TagRef::Name(name) => {
                let name = name.trim();
                if name.chars().count() > 255 {
                    return Err(LinkaceError::validation(
                        Edge::Tags.field(),
                        "Tag names may not be greater than 255 characters.",
                    ));
                }
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
        }
    }

    let mut resolved = owned_ids::<tag::Entity, C>(conn, user_id, &wanted_ids).await?;
    if resolved != wanted_ids {
        return Err(LinkaceError::validation(
            Edge::Tags.field(),
            "The selected tags are invalid.",
        ));
    }

    for name in names {
        let existing = tag::Entity::find()
            .filter(scoped::<tag::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .filter(tag::Column::Name.eq(name.as_str()))
            .one(conn)
            .await?;

        let id = match existing {
            Some(model) => model.id,
            None => {
                let now = Utc::now();
                let created = tag::Entity::insert(tag::ActiveModel {
                    user_id: Set(user_id),
                    name: Set(name.clone()),
                    is_private: Set(new_tags_private),
                    created_at: Set(now),
                    updated_at: Set(now),
                    deleted_at: Set(None),
                    ..Default::default()
                })
                .exec(conn)
                .await?;
                debug!("Created tag '{}' for user {}", name, user_id);
                created.last_insert_id
            }
        };
        resolved.insert(id);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i32]) -> BTreeSet<i32> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_diff_edges_set_difference() {
        let diff = diff_edges(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(diff.insert, set(&[4, 5]));
        assert_eq!(diff.remove, set(&[1]));
    }

    #[test]
    fn test_diff_edges_unchanged_is_empty() {
        let diff = diff_edges(&set(&[7, 8]), &set(&[8, 7]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_edges_clear_all() {
        let diff = diff_edges(&set(&[1, 2]), &BTreeSet::new());
        assert!(diff.insert.is_empty());
        assert_eq!(diff.remove, set(&[1, 2]));
    }

    #[test]
    fn test_diff_edges_from_empty() {
        let diff = diff_edges(&BTreeSet::new(), &set(&[9]));
        assert_eq!(diff.insert, set(&[9]));
        assert!(diff.remove.is_empty());
    }

    #[test]
    fn test_edge_field_names() {
        assert_eq!(Edge::Tags.field(), "tags");
        assert_eq!(Edge::Lists.field(), "lists");
    }
}
