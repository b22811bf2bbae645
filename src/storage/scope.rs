//! 所有权与回收站作用域
//!
//! 每个按用户读取的查询都经过 `OwnerScope`，保证访客只看到公开数据、
//! 用户只看到自己的数据。

use sea_orm::{ColumnTrait, Condition, EntityTrait};

use migration::entities::{link, link_list, tag};

/// 可归属用户且支持软删除的实体
pub trait OwnedEntity: EntityTrait {
    fn id_column() -> Self::Column;
    fn user_id_column() -> Self::Column;
    fn is_private_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
}

impl OwnedEntity for link::Entity {
    fn id_column() -> Self::Column {
        link::Column::Id
    }
    fn user_id_column() -> Self::Column {
        link::Column::UserId
    }
    fn is_private_column() -> Self::Column {
        link::Column::IsPrivate
    }
    fn deleted_at_column() -> Self::Column {
        link::Column::DeletedAt
    }
}

impl OwnedEntity for tag::Entity {
    fn id_column() -> Self::Column {
        tag::Column::Id
    }
    fn user_id_column() -> Self::Column {
        tag::Column::UserId
    }
    fn is_private_column() -> Self::Column {
        tag::Column::IsPrivate
    }
    fn deleted_at_column() -> Self::Column {
        tag::Column::DeletedAt
    }
}

impl OwnedEntity for link_list::Entity {
    fn id_column() -> Self::Column {
        link_list::Column::Id
    }
    fn user_id_column() -> Self::Column {
        link_list::Column::UserId
    }
    fn is_private_column() -> Self::Column {
        link_list::Column::IsPrivate
    }
    fn deleted_at_column() -> Self::Column {
        link_list::Column::DeletedAt
    }
}

/// 带名称列的实体（标签、列表），名称在同一用户内唯一
pub trait NamedEntity: OwnedEntity {
    fn name_column() -> Self::Column;
}

impl NamedEntity for tag::Entity {
    fn name_column() -> Self::Column {
        tag::Column::Name
    }
}

impl NamedEntity for link_list::Entity {
    fn name_column() -> Self::Column {
        link_list::Column::Name
    }
}

/// 请求者身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// 登录用户，只能访问自己的数据
    User(i32),
    /// 访客，只能访问公开数据
    Guest,
}

impl OwnerScope {
    pub fn user_id(&self) -> Option<i32> {
        match self {
            OwnerScope::User(id) => Some(*id),
            OwnerScope::Guest => None,
        }
    }

    pub fn condition<E: OwnedEntity>(&self) -> Condition {
        match self {
            OwnerScope::User(id) => Condition::all().add(E::user_id_column().eq(*id)),
            OwnerScope::Guest => Condition::all().add(E::is_private_column().eq(false)),
        }
    }
}

/// 软删除过滤方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashFilter {
    /// 默认：排除已删除
    #[default]
    Exclude,
    /// with_trashed
    Include,
    /// only_trashed
    Only,
}

impl TrashFilter {
    pub fn condition<E: OwnedEntity>(&self) -> Condition {
        match self {
            TrashFilter::Exclude => Condition::all().add(E::deleted_at_column().is_null()),
            TrashFilter::Include => Condition::all(),
            TrashFilter::Only => Condition::all().add(E::deleted_at_column().is_not_null()),
        }
    }
}

/// 组合所有权和软删除条件
pub fn scoped<E: OwnedEntity>(scope: OwnerScope, trash: TrashFilter) -> Condition {
    Condition::all()
        .add(scope.condition::<E>())
        .add(trash.condition::<E>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    fn sql(cond: Condition) -> String {
        link::Entity::find()
            .filter(cond)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_user_scope_filters_owner_and_trash() {
        let sql = sql(scoped::<link::Entity>(
            OwnerScope::User(7),
            TrashFilter::Exclude,
        ));
        assert!(sql.contains(r#""links"."user_id" = 7"#), "{}", sql);
        assert!(sql.contains(r#""links"."deleted_at" IS NULL"#), "{}", sql);
    }

    #[test]
    fn test_guest_scope_only_public() {
        let sql = sql(scoped::<link::Entity>(
            OwnerScope::Guest,
            TrashFilter::Exclude,
        ));
        assert!(sql.contains(r#""links"."is_private" ="#), "{}", sql);
        assert!(!sql.contains(r#""links"."user_id" ="#), "{}", sql);
    }

    #[test]
    fn test_only_trashed() {
        let sql = sql(scoped::<link::Entity>(OwnerScope::User(1), TrashFilter::Only));
        assert!(sql.contains(r#""links"."deleted_at" IS NOT NULL"#), "{}", sql);
    }
}
