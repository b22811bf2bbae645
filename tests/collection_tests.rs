//! List, tag and trash tests

mod common;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{collection, create_user, link, setup};
use linkace::errors::LinkaceError;
use linkace::services::{CollectionInput, LinkInput, UserSettings};
use linkace::storage::{EntityKind, OwnerScope, PageRequest};
use migration::entities::link as link_entity;

fn assert_name_error<T: std::fmt::Debug>(result: linkace::errors::Result<T>) {
    match result {
        Err(LinkaceError::Validation(errors)) => assert!(errors.has("name")),
        other => panic!("expected name validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_name_unique_per_user() {
    let env = setup().await;
    let (alice, _) = create_user(&env.services, "alice").await;
    let (bob, _) = create_user(&env.services, "bob").await;

    env.services
        .lists
        .create(alice.id, collection("Reading"))
        .await
        .unwrap();

    assert_name_error(
        env.services
            .lists
            .create(alice.id, collection("Reading"))
            .await,
    );

    // 另一个用户可以使用相同名称
    let other = env
        .services
        .lists
        .create(bob.id, collection("Reading"))
        .await
        .unwrap();
    assert_eq!(other.user_id, bob.id);
}

#[tokio::test]
async fn test_list_update_with_taken_name_fails() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .lists
        .create(user.id, collection("Reading"))
        .await
        .unwrap();
    let later = env
        .services
        .lists
        .create(user.id, collection("Later"))
        .await
        .unwrap();

    assert_name_error(
        env.services
            .lists
            .update(user.id, later.id, collection("Reading"))
            .await,
    );

    // 保留自己的名称不算冲突
    let renamed = env
        .services
        .lists
        .update(
            user.id,
            later.id,
            CollectionInput {
                description: Some("Stuff to read later".into()),
                ..collection("Later")
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.description.as_deref(), Some("Stuff to read later"));
}

#[tokio::test]
async fn test_private_defaults_for_lists_and_tags() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .settings
        .save_user_settings(
            user.id,
            &UserSettings {
                lists_private_default: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let list = env
        .services
        .lists
        .create(user.id, collection("Secret"))
        .await
        .unwrap();
    assert!(list.is_private);

    let tag = env
        .services
        .tags
        .create(user.id, collection("open"))
        .await
        .unwrap();
    assert!(!tag.is_private);

    // 更新时未提供 is_private 则保持原值
    let list = env
        .services
        .lists
        .update(user.id, list.id, collection("Still secret"))
        .await
        .unwrap();
    assert!(list.is_private);
}

#[tokio::test]
async fn test_list_soft_delete_hides_list_but_keeps_link() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let list = env
        .services
        .lists
        .create(user.id, collection("Reading"))
        .await
        .unwrap();
    let created = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                lists: Some(vec![list.id]),
                ..link("https://example.com")
            },
        )
        .await
        .unwrap();

    env.services.lists.delete(user.id, list.id).await.unwrap();

    let scope = OwnerScope::User(user.id);
    assert!(
        env.services
            .lists
            .show(scope, list.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
    let page = env
        .services
        .lists
        .index(scope, PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    // 链接仍在，但不再显示已删除的列表
    let details = env
        .services
        .links
        .show(scope, created.link.link.id)
        .await
        .unwrap();
    assert!(details.lists.is_empty());

    // 恢复后关系重新可见
    env.services
        .trash
        .restore(EntityKind::List, user.id, list.id)
        .await
        .unwrap();
    let details = env
        .services
        .links
        .show(scope, created.link.link.id)
        .await
        .unwrap();
    assert_eq!(details.lists.len(), 1);
}

#[tokio::test]
async fn test_restore_rejects_name_taken_meanwhile() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;
    let scope = OwnerScope::User(user.id);

    let old = env
        .services
        .lists
        .create(user.id, collection("Reading"))
        .await
        .unwrap();
    env.services.lists.delete(user.id, old.id).await.unwrap();
    let replacement = env
        .services
        .lists
        .create(user.id, collection("Reading"))
        .await
        .unwrap();

    let err = env
        .services
        .trash
        .restore(EntityKind::List, user.id, old.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkaceError::Validation(ref e) if e.has("name")));

    // 旧列表留在回收站，只有一个同名的活动列表
    let active = env.services.lists.all(scope).await.unwrap();
    let ids: Vec<_> = active.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![replacement.id]);
    let trash = env.services.trash.contents(user.id).await.unwrap();
    assert_eq!(trash.lists.len(), 1);

    // 新列表改名后可以恢复
    env.services
        .lists
        .update(user.id, replacement.id, collection("Reading later"))
        .await
        .unwrap();
    env.services
        .trash
        .restore(EntityKind::List, user.id, old.id)
        .await
        .unwrap();
    assert_eq!(env.services.lists.all(scope).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_restore_tag_rejects_duplicate_name() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let old = env.services.tags.create(user.id, collection("rust")).await.unwrap();
    env.services.tags.delete(user.id, old.id).await.unwrap();
    env.services.tags.create(user.id, collection("rust")).await.unwrap();

    let err = env
        .services
        .trash
        .restore(EntityKind::Tag, user.id, old.id)
        .await
        .unwrap_err();
    assert!(err.validation_errors().is_some_and(|e| e.has("name")));
}

#[tokio::test]
async fn test_guest_scope_sees_only_public_collections() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let public = env
        .services
        .tags
        .create(
            user.id,
            CollectionInput {
                is_private: Some(false),
                ..collection("public")
            },
        )
        .await
        .unwrap();
    let private = env
        .services
        .tags
        .create(
            user.id,
            CollectionInput {
                is_private: Some(true),
                ..collection("private")
            },
        )
        .await
        .unwrap();

    assert!(env.services.tags.show(OwnerScope::Guest, public.id).await.is_ok());
    assert!(
        env.services
            .tags
            .show(OwnerScope::Guest, private.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_purge_removes_only_expired_trash() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let old = env
        .services
        .links
        .create(user.id, link("https://old.example.com"))
        .await
        .unwrap();
    let recent = env
        .services
        .links
        .create(user.id, link("https://recent.example.com"))
        .await
        .unwrap();
    let old_id = old.link.link.id;
    let recent_id = recent.link.link.id;

    env.services.links.delete(user.id, old_id).await.unwrap();
    env.services.links.delete(user.id, recent_id).await.unwrap();

    // 把其中一条的删除时间改到 40 天前
    link_entity::Entity::update_many()
        .col_expr(
            link_entity::Column::DeletedAt,
            Expr::value(Some(Utc::now() - Duration::days(40))),
        )
        .filter(link_entity::Column::Id.eq(old_id))
        .exec(env.services.storage.get_db())
        .await
        .unwrap();

    assert_eq!(env.services.trash.purge_older_than(0).await.unwrap(), 0);
    assert_eq!(env.services.trash.purge_older_than(30).await.unwrap(), 1);

    let trash = env.services.trash.contents(user.id).await.unwrap();
    let ids: Vec<_> = trash.links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![recent_id]);
}
