//! Shared test setup: a fresh SQLite database per test

#![allow(dead_code)]

use std::sync::Once;

use actix_web::cookie::Cookie;
use tempfile::TempDir;

use linkace::api::session::get_session_service;
use linkace::config::init_config;
use linkace::services::{AppServices, CollectionInput, LinkInput};
use linkace::storage::{StorageFactory, User};

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

pub struct TestEnv {
    pub services: AppServices,
    // 数据库文件随 TempDir 一起删除
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    init_test_config();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("linkace_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = StorageFactory::connect(&db_url)
        .await
        .expect("Failed to create storage");
    let services = AppServices::new(storage);
    services
        .settings
        .ensure_defaults()
        .await
        .expect("Failed to write default settings");

    TestEnv { services, _dir: dir }
}

/// 创建用户，返回用户和 API token
pub async fn create_user(services: &AppServices, name: &str) -> (User, String) {
    services
        .users
        .create(name, &format!("{}@example.com", name), "password123")
        .await
        .expect("Failed to create user")
}

pub fn session_cookie(user_id: i32) -> Cookie<'static> {
    let session = get_session_service();
    let token = session.issue(user_id).expect("Failed to issue session");
    session.session_cookie(token)
}

pub fn link(url: &str) -> LinkInput {
    LinkInput {
        url: url.to_string(),
        ..Default::default()
    }
}

pub fn titled_link(url: &str, title: &str) -> LinkInput {
    LinkInput {
        url: url.to_string(),
        title: Some(title.to_string()),
        ..Default::default()
    }
}

pub fn collection(name: &str) -> CollectionInput {
    CollectionInput {
        name: name.to_string(),
        ..Default::default()
    }
}
