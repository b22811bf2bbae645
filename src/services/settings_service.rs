//! Settings service
//!
//! 系统级设置（user_id 为 NULL）和用户设置的读写，读取时带默认值回落。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::Result;
use crate::storage::SeaOrmStorage;
use crate::storage::models::MAX_PER_PAGE;
use crate::utils::generate_random_code;

/// 已知的设置键
pub mod keys {
    pub const CRON_TOKEN: &str = "cron_token";
    pub const GUEST_ACCESS: &str = "guest_access";

    pub const LISTITEM_COUNT: &str = "listitem_count";
    pub const LINKS_PRIVATE_DEFAULT: &str = "links_private_default";
    pub const LISTS_PRIVATE_DEFAULT: &str = "lists_private_default";
    pub const TAGS_PRIVATE_DEFAULT: &str = "tags_private_default";

    /// 定时任务上次运行时间的键
    pub fn last_run(task: &str) -> String {
        format!("scheduler.{}.last_run", task)
    }
}

pub const CRON_TOKEN_LENGTH: usize = 32;

fn flag(value: Option<&String>) -> bool {
    matches!(value.map(|v| v.as_str()), Some("1") | Some("true"))
}

fn flag_value(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// 用户可编辑的设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub listitem_count: Option<u64>,
    pub links_private_default: bool,
    pub lists_private_default: bool,
    pub tags_private_default: bool,
}

pub struct SettingsService {
    storage: Arc<SeaOrmStorage>,
}

impl SettingsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 启动时补齐必须存在的系统设置
    pub async fn ensure_defaults(&self) -> Result<()> {
        if self.cron_token().await?.is_none() {
            self.regenerate_cron_token().await?;
            info!("SettingsService: generated initial cron token");
        }
        Ok(())
    }

    pub async fn cron_token(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_setting(None, keys::CRON_TOKEN)
            .await?
            .filter(|t| !t.is_empty()))
    }

    pub async fn regenerate_cron_token(&self) -> Result<String> {
        let token = generate_random_code(CRON_TOKEN_LENGTH);
        self.storage
            .put_setting(None, keys::CRON_TOKEN, &token)
            .await?;
        Ok(token)
    }

    /// 是否允许访客浏览公开内容；未设置时取静态配置
    pub async fn guest_access(&self) -> Result<bool> {
        match self.storage.get_setting(None, keys::GUEST_ACCESS).await? {
            Some(value) => Ok(flag(Some(&value))),
            None => Ok(get_config().app.guest_access_default),
        }
    }

    pub async fn set_guest_access(&self, enabled: bool) -> Result<()> {
        self.storage
            .put_setting(None, keys::GUEST_ACCESS, flag_value(enabled))
            .await
    }

    pub async fn user_settings(&self, user_id: i32) -> Result<UserSettings> {
        let raw = self.storage.settings_for(Some(user_id)).await?;

        let listitem_count = raw
            .get(keys::LISTITEM_COUNT)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0);
        if raw.contains_key(keys::LISTITEM_COUNT) && listitem_count.is_none() {
            warn!(
                "SettingsService: ignoring invalid listitem_count for user {}",
                user_id
            );
        }

        Ok(UserSettings {
            listitem_count,
            links_private_default: flag(raw.get(keys::LINKS_PRIVATE_DEFAULT)),
            lists_private_default: flag(raw.get(keys::LISTS_PRIVATE_DEFAULT)),
            tags_private_default: flag(raw.get(keys::TAGS_PRIVATE_DEFAULT)),
        })
    }

    pub async fn save_user_settings(&self, user_id: i32, settings: &UserSettings) -> Result<()> {
        let user = Some(user_id);
        let count = settings
            .listitem_count
            .map(|c| c.to_string())
            .unwrap_or_default();
        self.storage
            .put_settings(
                user,
                &[
                    (keys::LISTITEM_COUNT, count.as_str()),
                    (
                        keys::LINKS_PRIVATE_DEFAULT,
                        flag_value(settings.links_private_default),
                    ),
                    (
                        keys::LISTS_PRIVATE_DEFAULT,
                        flag_value(settings.lists_private_default),
                    ),
                    (
                        keys::TAGS_PRIVATE_DEFAULT,
                        flag_value(settings.tags_private_default),
                    ),
                ],
            )
            .await?;
        info!("SettingsService: settings saved for user {}", user_id);
        Ok(())
    }

    /// 每页条数：显式参数 > 用户设置 > 静态配置
    pub async fn page_size(&self, user_id: Option<i32>, requested: Option<u64>) -> Result<u64> {
        if let Some(per_page) = requested {
            return Ok(per_page.clamp(1, MAX_PER_PAGE));
        }
        if let Some(id) = user_id
            && let Some(count) = self.user_settings(id).await?.listitem_count
        {
            return Ok(count.clamp(1, MAX_PER_PAGE));
        }
        Ok(get_config().app.pagination_limit.clamp(1, MAX_PER_PAGE))
    }

    pub async fn last_run(&self, task: &str) -> Result<Option<DateTime<Utc>>> {
        let raw = self.storage.get_setting(None, &keys::last_run(task)).await?;
        Ok(raw
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|t| t.with_timezone(&Utc)))
    }

    pub async fn set_last_run(&self, task: &str, at: DateTime<Utc>) -> Result<()> {
        self.storage
            .put_setting(None, &keys::last_run(task), &at.to_rfc3339())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert!(flag(Some(&"1".to_string())));
        assert!(flag(Some(&"true".to_string())));
        assert!(!flag(Some(&"0".to_string())));
        assert!(!flag(None));
    }

    #[test]
    fn test_last_run_key() {
        assert_eq!(keys::last_run("check_links"), "scheduler.check_links.last_run");
    }
}
