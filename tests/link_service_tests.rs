//! LinkService tests
//!
//! Tests for link creation defaults, duplicate detection, relation sync and
//! soft deletes.

mod common;

use common::{collection, create_user, link, setup, titled_link};
use linkace::errors::LinkaceError;
use linkace::services::{LinkInput, UserSettings};
use linkace::storage::{EntityKind, OwnerScope, TagRef};

#[tokio::test]
async fn test_create_defaults_title_to_host() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let created = env
        .services
        .links
        .create(user.id, link("https://www.example.com/page"))
        .await
        .unwrap();
    assert_eq!(created.link.link.title, "example.com");
    assert!(!created.link.link.is_private);
    assert!(created.duplicates.is_empty());
}

#[tokio::test]
async fn test_create_uses_private_default_setting() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .settings
        .save_user_settings(
            user.id,
            &UserSettings {
                links_private_default: true,
                tags_private_default: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let created = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                tags: Some(vec![TagRef::Name("fresh".into())]),
                ..link("https://example.com")
            },
        )
        .await
        .unwrap();
    assert!(created.link.link.is_private);
    assert_eq!(created.link.tags.len(), 1);
    assert!(created.link.tags[0].is_private);

    // 显式值优先于默认值
    let public = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                is_private: Some(false),
                ..link("https://example.org")
            },
        )
        .await
        .unwrap();
    assert!(!public.link.link.is_private);
}

#[tokio::test]
async fn test_duplicate_url_is_reported_not_rejected() {
    let env = setup().await;
    let (alice, _) = create_user(&env.services, "alice").await;
    let (bob, _) = create_user(&env.services, "bob").await;

    let first = env
        .services
        .links
        .create(alice.id, link("https://example.com"))
        .await
        .unwrap();
    // 其他用户的同名链接不算重复
    env.services
        .links
        .create(bob.id, link("https://example.com"))
        .await
        .unwrap();

    let second = env
        .services
        .links
        .create(alice.id, link("https://example.com"))
        .await
        .unwrap();
    assert_ne!(first.link.link.id, second.link.link.id);
    assert_eq!(second.duplicates.len(), 1);
    assert_eq!(second.duplicates[0].id, first.link.link.id);
}

#[tokio::test]
async fn test_tags_by_name_reuse_existing() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let existing = env
        .services
        .tags
        .create(user.id, collection("rust"))
        .await
        .unwrap();

    let created = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                tags: Some(vec![TagRef::Name("rust".into()), TagRef::Name("web".into())]),
                ..link("https://example.com")
            },
        )
        .await
        .unwrap();

    let names: Vec<_> = created.link.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "web"]);
    assert!(created.link.tags.iter().any(|t| t.id == existing.id));
}

#[tokio::test]
async fn test_update_rolls_back_when_relation_sync_fails() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let created = env
        .services
        .links
        .create(user.id, titled_link("https://example.com", "Original"))
        .await
        .unwrap();
    let id = created.link.link.id;

    let result = env
        .services
        .links
        .update(
            user.id,
            id,
            LinkInput {
                lists: Some(vec![9999]),
                ..titled_link("https://changed.example.com", "Changed")
            },
        )
        .await;
    match result {
        Err(LinkaceError::Validation(errors)) => assert!(errors.has("lists")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let after = env
        .services
        .links
        .show(OwnerScope::User(user.id), id)
        .await
        .unwrap();
    assert_eq!(after.link.title, "Original");
    assert_eq!(after.link.url, "https://example.com");
}

#[tokio::test]
async fn test_update_keeps_relations_when_omitted() {
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
                tags: Some(vec![TagRef::Name("rust".into())]),
                ..link("https://example.com")
            },
        )
        .await
        .unwrap();
    let id = created.link.link.id;

    let updated = env
        .services
        .links
        .update(user.id, id, titled_link("https://example.com", "Renamed"))
        .await
        .unwrap();
    assert_eq!(updated.link.title, "Renamed");
    assert_eq!(updated.lists.len(), 1);
    assert_eq!(updated.tags.len(), 1);

    // 空集合表示清空
    let cleared = env
        .services
        .links
        .update(
            user.id,
            id,
            LinkInput {
                lists: Some(vec![]),
                tags: Some(vec![]),
                ..link("https://example.com")
            },
        )
        .await
        .unwrap();
    assert!(cleared.lists.is_empty());
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
async fn test_foreign_link_is_not_found() {
    let env = setup().await;
    let (alice, _) = create_user(&env.services, "alice").await;
    let (bob, _) = create_user(&env.services, "bob").await;

    let created = env
        .services
        .links
        .create(alice.id, link("https://example.com"))
        .await
        .unwrap();
    let id = created.link.link.id;

    let err = env
        .services
        .links
        .show(OwnerScope::User(bob.id), id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = env
        .services
        .links
        .update(bob.id, id, link("https://evil.com"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_moves_link_to_trash_and_restore() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let created = env
        .services
        .links
        .create(user.id, link("https://example.com"))
        .await
        .unwrap();
    let id = created.link.link.id;

    env.services.links.delete(user.id, id).await.unwrap();
    assert!(
        env.services
            .links
            .show(OwnerScope::User(user.id), id)
            .await
            .unwrap_err()
            .is_not_found()
    );

    let trash = env.services.trash.contents(user.id).await.unwrap();
    assert_eq!(trash.links.len(), 1);
    assert!(trash.links[0].is_trashed());

    env.services
        .trash
        .restore(EntityKind::Link, user.id, id)
        .await
        .unwrap();
    assert!(
        env.services
            .links
            .show(OwnerScope::User(user.id), id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_toggle_check_disabled() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let created = env
        .services
        .links
        .create(user.id, link("https://example.com"))
        .await
        .unwrap();
    let link = env
        .services
        .links
        .set_check_disabled(user.id, created.link.link.id, true)
        .await
        .unwrap();
    assert!(link.check_disabled);
}
