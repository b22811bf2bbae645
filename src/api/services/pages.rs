//! 浏览器页面共用的小工具

use actix_web::HttpResponse;
use serde::Serialize;

use crate::api::flash::{self, FlashLink, FlashMessage};
use crate::storage::{Link, LinkDetails, LinkList, Tag};

pub fn redirect(location: &str) -> HttpResponse {
    flash::redirect(location, Vec::new())
}

/// 表单 `_method` 字段对应的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Patch,
    Delete,
}

impl FormMethod {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("patch") | Some("put") => Some(FormMethod::Patch),
            Some("delete") => Some(FormMethod::Delete),
            _ => None,
        }
    }
}

/// 去掉协议的短 URL，用于提示文字
pub fn short_url(url: &str) -> &str {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

/// 新建链接后的重复 URL 提示
pub fn duplicates_flash(duplicates: &[Link]) -> Option<FlashMessage> {
    if duplicates.is_empty() {
        return None;
    }
    let links = duplicates
        .iter()
        .map(|d| FlashLink {
            href: format!("/links/{}", d.id),
            label: short_url(&d.url).to_string(),
        })
        .collect();
    Some(FlashMessage::warning("Found potential duplicates:").with_links(links))
}

/// 链接表单回显数据
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkFormView {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub lists: String,
    pub is_private: bool,
}

impl LinkFormView {
    pub fn from_details(details: &LinkDetails) -> Self {
        let join = |ids: Vec<i32>| {
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        Self {
            url: details.link.url.clone(),
            title: details.link.title.clone(),
            description: details.link.description.clone().unwrap_or_default(),
            tags: join(details.tags.iter().map(|t| t.id).collect()),
            lists: join(details.lists.iter().map(|l| l.id).collect()),
            is_private: details.link.is_private,
        }
    }
}

/// 列表和标签在页面上的统一形态
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
}

impl From<LinkList> for CollectionView {
    fn from(list: LinkList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            description: list.description,
            is_private: list.is_private,
        }
    }
}

impl From<Tag> for CollectionView {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            description: None,
            is_private: tag.is_private,
        }
    }
}

/// 集合表单回显数据
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionFormView {
    pub name: String,
    pub description: String,
    pub is_private: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_method() {
        assert_eq!(FormMethod::parse(Some("PATCH")), Some(FormMethod::Patch));
        assert_eq!(FormMethod::parse(Some("delete")), Some(FormMethod::Delete));
        assert_eq!(FormMethod::parse(Some("get")), None);
        assert_eq!(FormMethod::parse(None), None);
    }

    #[test]
    fn test_short_url() {
        assert_eq!(short_url("https://example.com/"), "example.com");
        assert_eq!(short_url("http://test.com/a"), "test.com/a");
    }
}
