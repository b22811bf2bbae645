//! Link service layer
//!
//! 浏览器路由和 JSON API 共用的链接业务逻辑：
//! 默认值填充、创建后的重复 URL 检测、关系同步、分页大小解析。

use std::sync::Arc;

use sea_orm::Condition;
use serde::Serialize;
use tracing::{debug, info};

use super::settings_service::SettingsService;
use crate::config::get_config;
use crate::errors::{LinkaceError, Result};
use crate::storage::{
    EntityKind, Link, LinkDetails, LinkOrder, LinkSearch, LinkWrite, OwnerScope, PageRequest,
    Paginated, SeaOrmStorage, TagRef, TrashFilter,
};
use crate::utils::url_host;

// ============ Request/Response DTOs ============

/// 提交的链接数据（已通过表单校验）
///
/// `None` 的字段按用户设置或原记录补齐。
#[derive(Debug, Clone, Default)]
pub struct LinkInput {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
    pub tags: Option<Vec<TagRef>>,
    pub lists: Option<Vec<i32>>,
}

/// 新建结果：重复链接只作为提示，不影响创建
#[derive(Debug, Clone, Serialize)]
pub struct LinkCreated {
    #[serde(flatten)]
    pub link: LinkDetails,
    pub duplicates: Vec<Link>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// 标题为空时使用主机名，解析失败则用 URL 本身
fn title_or_host(title: Option<&String>, url: &str) -> String {
    non_empty(title)
        .or_else(|| url_host(url))
        .unwrap_or_else(|| url.trim().to_string())
}

// ============ Service Implementation ============

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    settings: Arc<SettingsService>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, settings: Arc<SettingsService>) -> Self {
        Self { storage, settings }
    }

    pub async fn page_request(
        &self,
        user_id: Option<i32>,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<PageRequest> {
        let per_page = self.settings.page_size(user_id, per_page).await?;
        Ok(PageRequest::new(page.unwrap_or(1), per_page))
    }

    /// 按范围浏览全部未删除链接
    pub async fn index(
        &self,
        scope: OwnerScope,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        self.storage
            .paginate_links(scope, Condition::all(), order, page)
            .await
    }

    pub async fn search(
        &self,
        scope: OwnerScope,
        search: &LinkSearch,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        let result = self.storage.search_links(scope, search, order, page).await?;
        debug!(
            "LinkService: search '{}' matched {} links",
            search.query, result.total
        );
        Ok(result)
    }

    /// 查找单条链接，连同标签和列表
    pub async fn show(&self, scope: OwnerScope, id: i32) -> Result<LinkDetails> {
        let link = self
            .storage
            .find_link(scope, id, TrashFilter::Exclude)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("Link {} not found", id)))?;
        self.storage.link_details(scope, link).await
    }

    pub async fn create(&self, user_id: i32, input: LinkInput) -> Result<LinkCreated> {
        let defaults = self.settings.user_settings(user_id).await?;

        let write = LinkWrite {
            title: title_or_host(input.title.as_ref(), &input.url),
            url: input.url.trim().to_string(),
            description: non_empty(input.description.as_ref()),
            icon: non_empty(input.icon.as_ref()),
            is_private: input.is_private.unwrap_or(defaults.links_private_default),
            tags: input.tags,
            lists: input.lists,
            new_tags_private: defaults.tags_private_default,
        };

        let link = self.storage.create_link(user_id, &write).await?;
        info!("LinkService: link {} created", link.id);

        // 先提交，再查重
        let duplicates = self
            .storage
            .find_duplicate_links(user_id, &link.url, link.id, get_config().links.duplicate_match)
            .await?;
        if !duplicates.is_empty() {
            info!(
                "LinkService: link {} duplicates {} existing links",
                link.id,
                duplicates.len()
            );
        }

        let details = self
            .storage
            .link_details(OwnerScope::User(user_id), link)
            .await?;
        Ok(LinkCreated {
            link: details,
            duplicates,
        })
    }

    pub async fn update(&self, user_id: i32, id: i32, input: LinkInput) -> Result<LinkDetails> {
        let scope = OwnerScope::User(user_id);
        let existing = self
            .storage
            .find_link(scope, id, TrashFilter::Exclude)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("Link {} not found", id)))?;
        let defaults = self.settings.user_settings(user_id).await?;

        let write = LinkWrite {
            title: title_or_host(input.title.as_ref(), &input.url),
            url: input.url.trim().to_string(),
            description: non_empty(input.description.as_ref()),
            icon: non_empty(input.icon.as_ref()).or(existing.icon),
            is_private: input.is_private.unwrap_or(existing.is_private),
            tags: input.tags,
            lists: input.lists,
            new_tags_private: defaults.tags_private_default,
        };

        let link = self.storage.update_link(user_id, id, &write).await?;
        self.storage.link_details(scope, link).await
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<()> {
        self.storage.trash(EntityKind::Link, user_id, id).await
    }

    pub async fn set_check_disabled(&self, user_id: i32, id: i32, disabled: bool) -> Result<Link> {
        let link = self
            .storage
            .set_link_check_disabled(user_id, id, disabled)
            .await?;
        info!(
            "LinkService: checks for link {} {}",
            id,
            if disabled { "disabled" } else { "enabled" }
        );
        Ok(link)
    }

    pub async fn in_list(
        &self,
        scope: OwnerScope,
        list_id: i32,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        self.storage.links_in_list(scope, list_id, order, page).await
    }

    pub async fn with_tag(
        &self,
        scope: OwnerScope,
        tag_id: i32,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        self.storage.links_with_tag(scope, tag_id, order, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_falls_back_to_host() {
        assert_eq!(
            title_or_host(None, "https://www.example.com/page"),
            "example.com"
        );
        assert_eq!(
            title_or_host(Some(&"   ".to_string()), "https://test.com"),
            "test.com"
        );
        assert_eq!(
            title_or_host(Some(&" Docs ".to_string()), "https://test.com"),
            "Docs"
        );
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some(&"".to_string())), None);
        assert_eq!(non_empty(Some(&" a ".to_string())), Some("a".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
