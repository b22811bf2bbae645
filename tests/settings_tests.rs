//! Settings storage tests

mod common;

use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

use common::{create_user, setup};
use linkace::services::UserSettings;
use migration::entities::setting;

#[tokio::test]
async fn test_user_settings_are_saved_together() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let settings = UserSettings {
        listitem_count: Some(50),
        links_private_default: true,
        lists_private_default: false,
        tags_private_default: true,
    };
    env.services
        .settings
        .save_user_settings(user.id, &settings)
        .await
        .unwrap();
    assert_eq!(
        env.services.settings.user_settings(user.id).await.unwrap(),
        settings
    );

    // 再次保存只更新已有行
    env.services
        .settings
        .save_user_settings(
            user.id,
            &UserSettings {
                listitem_count: Some(10),
                ..settings.clone()
            },
        )
        .await
        .unwrap();
    let rows = setting::Entity::find()
        .filter(setting::Column::UserId.eq(user.id))
        .all(env.services.storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    let raw = env.services.storage.settings_for(Some(user.id)).await.unwrap();
    assert_eq!(raw.get("listitem_count").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn test_duplicate_user_setting_row_is_rejected() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;
    env.services
        .storage
        .put_setting(Some(user.id), "listitem_count", "24")
        .await
        .unwrap();

    let duplicate = setting::ActiveModel {
        user_id: Set(Some(user.id)),
        key: Set("listitem_count".to_string()),
        value: Set("48".to_string()),
        ..Default::default()
    }
    .insert(env.services.storage.get_db())
    .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_put_settings_writes_system_rows_once() {
    let env = setup().await;
    let storage = &env.services.storage;

    storage
        .put_settings(None, &[("guest_access", "1"), ("cron_token", "abc")])
        .await
        .unwrap();
    storage
        .put_settings(None, &[("guest_access", "0")])
        .await
        .unwrap();

    let rows = setting::Entity::find()
        .filter(setting::Column::UserId.is_null())
        .filter(setting::Column::Key.eq("guest_access"))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, "0");
    assert_eq!(
        storage.get_setting(None, "cron_token").await.unwrap().as_deref(),
        Some("abc")
    );
}
