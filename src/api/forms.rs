//! 请求校验
//!
//! 表单和查询参数先反序列化为全部可选的字符串字段，
//! 再由 `validate` 转换为服务层输入，错误按字段归类。

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::errors::{Result, ValidationErrors};
use crate::services::{CollectionInput, LinkInput, UserSettings};
use crate::storage::models::MAX_PER_PAGE;
use crate::storage::{LinkOrder, LinkSearch, TagRef};
use crate::utils::{parse_form_bool, parse_id_list, validate_url, validation_error_message};

pub const MAX_NAME_LENGTH: usize = 255;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 可选布尔字段；非法值记录错误
fn optional_bool(errors: &mut ValidationErrors, field: &str, value: &Option<String>) -> Option<bool> {
    let raw = value.as_deref()?;
    match parse_form_bool(raw) {
        Some(b) => Some(b),
        None => {
            errors.add(field, format!("The {} field must be true or false.", field));
            None
        }
    }
}

fn optional_number(errors: &mut ValidationErrors, field: &str, value: &Option<String>) -> Option<u64> {
    let raw = present(value)?;
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            errors.add(field, format!("The {} must be a positive integer.", field));
            None
        }
    }
}

fn id_set(errors: &mut ValidationErrors, field: &str, value: &Option<String>) -> BTreeSet<i32> {
    let Some(raw) = present(value) else {
        return BTreeSet::new();
    };
    match parse_id_list(raw) {
        Some(ids) => ids.into_iter().collect(),
        None => {
            errors.add(
                field,
                format!("The {} must be a comma separated list of IDs.", field),
            );
            BTreeSet::new()
        }
    }
}

// ============ Search ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub search_title: Option<String>,
    pub search_description: Option<String>,
    pub private_only: Option<String>,
    pub broken_only: Option<String>,
    pub only_lists: Option<String>,
    pub only_tags: Option<String>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSearch {
    pub search: LinkSearch,
    pub order: LinkOrder,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<ValidatedSearch> {
        let mut errors = ValidationErrors::new();

        let query = match present(&self.query) {
            Some(q) => q.to_string(),
            None => {
                errors.add("query", "The query field is required.");
                String::new()
            }
        };

        let search = LinkSearch {
            query,
            search_title: optional_bool(&mut errors, "search_title", &self.search_title)
                .unwrap_or(false),
            search_description: optional_bool(
                &mut errors,
                "search_description",
                &self.search_description,
            )
            .unwrap_or(false),
            private_only: optional_bool(&mut errors, "private_only", &self.private_only)
                .unwrap_or(false),
            broken_only: optional_bool(&mut errors, "broken_only", &self.broken_only)
                .unwrap_or(false),
            only_list_ids: id_set(&mut errors, "only_lists", &self.only_lists),
            only_tag_ids: id_set(&mut errors, "only_tags", &self.only_tags),
        };
        let page = optional_number(&mut errors, "page", &self.page);
        let per_page = optional_number(&mut errors, "per_page", &self.per_page)
            .map(|n| n.min(MAX_PER_PAGE));

        errors.into_result(ValidatedSearch {
            search,
            order: LinkOrder::parse(self.order_by.as_deref(), self.order_dir.as_deref()),
            page,
            per_page,
        })
    }
}

/// 列表页的分页和排序参数（非法值回落默认）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListingQuery {
    pub fn order(&self) -> LinkOrder {
        LinkOrder::parse(self.order_by.as_deref(), self.order_dir.as_deref())
    }

    pub fn page(&self) -> Option<u64> {
        present(&self.page).and_then(|p| p.parse().ok())
    }

    pub fn per_page(&self) -> Option<u64> {
        present(&self.per_page)
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|p| *p > 0)
    }
}

// ============ Links ============

/// 浏览器链接表单；`tags` 可混合标签 ID 和新标签名
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkForm {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub lists: Option<String>,
    pub is_private: Option<String>,
    pub reload_view: Option<String>,
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

/// 逗号分隔的标签输入：纯数字按 ID，其余按名称
pub fn parse_tag_input(raw: &str) -> Vec<TagRef> {
    let mut refs: Vec<TagRef> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| match t.parse::<i32>() {
            Ok(id) if id > 0 => TagRef::Id(id),
            _ => TagRef::Name(t.to_string()),
        })
        .collect();
    refs.sort();
    refs.dedup();
    refs
}

fn check_url(errors: &mut ValidationErrors, url: Option<&str>) -> String {
    match validate_url(url.unwrap_or_default()) {
        Ok(_) => url.unwrap_or_default().trim().to_string(),
        Err(e) => {
            errors.add("url", validation_error_message(&e));
            String::new()
        }
    }
}

fn check_title(errors: &mut ValidationErrors, title: Option<&str>) {
    if let Some(title) = title
        && title.chars().count() > MAX_NAME_LENGTH
    {
        errors.add(
            "title",
            format!("The title may not be greater than {} characters.", MAX_NAME_LENGTH),
        );
    }
}

impl LinkForm {
    /// 浏览器表单中缺失的 tags / lists 视为清空
    pub fn validate(&self) -> Result<LinkInput> {
        let mut errors = ValidationErrors::new();

        let url = check_url(&mut errors, self.url.as_deref());
        check_title(&mut errors, present(&self.title));
        let is_private = optional_bool(&mut errors, "is_private", &self.is_private);

        let tags = parse_tag_input(self.tags.as_deref().unwrap_or_default());
        if tags.iter().any(|t| matches!(t, TagRef::Name(n) if n.chars().count() > MAX_NAME_LENGTH)) {
            errors.add("tags", "The selected tags are invalid.");
        }
        let lists = match parse_id_list(self.lists.as_deref().unwrap_or_default()) {
            Some(ids) => ids,
            None => {
                errors.add("lists", "The selected lists are invalid.");
                Vec::new()
            }
        };

        errors.into_result(LinkInput {
            url,
            title: present(&self.title).map(String::from),
            description: present(&self.description).map(String::from),
            icon: None,
            is_private,
            tags: Some(tags),
            lists: Some(lists),
        })
    }

    pub fn reload_view(&self) -> bool {
        self.reload_view
            .as_deref()
            .and_then(parse_form_bool)
            .unwrap_or(false)
    }
}

/// JSON API 中的标签引用：数字为 ID，字符串为名称
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiTagRef {
    Id(i32),
    Name(String),
}

/// JSON API 链接数据；缺省的 tags / lists 保持原关系
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiLinkPayload {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_private: Option<bool>,
    pub tags: Option<Vec<ApiTagRef>>,
    pub lists: Option<Vec<i32>>,
}

impl ApiLinkPayload {
    pub fn validate(self) -> Result<LinkInput> {
        let mut errors = ValidationErrors::new();

        let url = check_url(&mut errors, self.url.as_deref());
        check_title(&mut errors, self.title.as_deref());

        let tags = self.tags.map(|refs| {
            let mut out: Vec<TagRef> = Vec::with_capacity(refs.len());
            for r in refs {
                match r {
                    ApiTagRef::Id(id) if id > 0 => out.push(TagRef::Id(id)),
                    ApiTagRef::Name(name) if !name.trim().is_empty() => {
                        out.push(TagRef::Name(name.trim().to_string()))
                    }
                    _ => {
                        if !errors.has("tags") {
                            errors.add("tags", "The selected tags are invalid.");
                        }
                    }
                }
            }
            out.sort();
            out.dedup();
            out
        });
        if let Some(lists) = &self.lists
            && lists.iter().any(|id| *id <= 0)
        {
            errors.add("lists", "The selected lists are invalid.");
        }

        errors.into_result(LinkInput {
            url,
            title: self.title,
            description: self.description,
            icon: self.icon,
            is_private: self.is_private,
            tags,
            lists: self.lists,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleCheckForm {
    pub toggle: Option<String>,
}

impl ToggleCheckForm {
    pub fn validate(&self) -> Result<bool> {
        let mut errors = ValidationErrors::new();
        let toggle = match optional_bool(&mut errors, "toggle", &self.toggle) {
            Some(v) => v,
            None => {
                if !errors.has("toggle") {
                    errors.add("toggle", "The toggle field is required.");
                }
                false
            }
        };
        errors.into_result(toggle)
    }
}

// ============ Lists / Tags ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<String>,
    pub reload_view: Option<String>,
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

impl CollectionForm {
    pub fn validate(&self) -> Result<CollectionInput> {
        let mut errors = ValidationErrors::new();

        let name = match present(&self.name) {
            None => {
                errors.add("name", "The name field is required.");
                String::new()
            }
            Some(n) if n.chars().count() > MAX_NAME_LENGTH => {
                errors.add(
                    "name",
                    format!("The name may not be greater than {} characters.", MAX_NAME_LENGTH),
                );
                String::new()
            }
            Some(n) => n.to_string(),
        };
        let is_private = optional_bool(&mut errors, "is_private", &self.is_private);

        errors.into_result(CollectionInput {
            name,
            description: present(&self.description).map(String::from),
            is_private,
        })
    }

    pub fn reload_view(&self) -> bool {
        self.reload_view
            .as_deref()
            .and_then(parse_form_bool)
            .unwrap_or(false)
    }
}

// ============ Auth / Settings ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(String, String)> {
        let mut errors = ValidationErrors::new();
        let email = present(&self.email).unwrap_or_default().to_string();
        if email.is_empty() {
            errors.add("email", "The email field is required.");
        }
        let password = self.password.clone().unwrap_or_default();
        if password.is_empty() {
            errors.add("password", "The password field is required.");
        }
        errors.into_result((email, password))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    pub listitem_count: Option<String>,
    pub links_private_default: Option<String>,
    pub lists_private_default: Option<String>,
    pub tags_private_default: Option<String>,
    pub guest_access: Option<String>,
}

impl SettingsForm {
    /// 返回用户设置和访客访问开关；未勾选的复选框不会提交，视为 false
    pub fn validate(&self) -> Result<(UserSettings, bool)> {
        let mut errors = ValidationErrors::new();

        let listitem_count = optional_number(&mut errors, "listitem_count", &self.listitem_count);
        if listitem_count.is_some_and(|n| n > MAX_PER_PAGE) {
            errors.add(
                "listitem_count",
                format!("The listitem count may not be greater than {}.", MAX_PER_PAGE),
            );
        }

        let settings = UserSettings {
            listitem_count,
            links_private_default: optional_bool(
                &mut errors,
                "links_private_default",
                &self.links_private_default,
            )
            .unwrap_or(false),
            lists_private_default: optional_bool(
                &mut errors,
                "lists_private_default",
                &self.lists_private_default,
            )
            .unwrap_or(false),
            tags_private_default: optional_bool(
                &mut errors,
                "tags_private_default",
                &self.tags_private_default,
            )
            .unwrap_or(false),
        };
        let guest_access =
            optional_bool(&mut errors, "guest_access", &self.guest_access).unwrap_or(false);

        errors.into_result((settings, guest_access))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LinkaceError;

    fn errors_of<T: std::fmt::Debug>(result: Result<T>) -> ValidationErrors {
        match result {
            Err(LinkaceError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_query() {
        let errors = errors_of(SearchQuery::default().validate());
        assert!(errors.has("query"));

        let only_flags = SearchQuery {
            private_only: Some("1".into()),
            only_lists: Some("1".into()),
            ..Default::default()
        };
        assert!(errors_of(only_flags.validate()).has("query"));

        let blank = SearchQuery {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert!(errors_of(blank.validate()).has("query"));
    }

    #[test]
    fn test_search_parses_flags_and_ids() {
        let query = SearchQuery {
            query: Some("example".into()),
            search_title: Some("1".into()),
            broken_only: Some("true".into()),
            only_lists: Some("2,1".into()),
            only_tags: Some("5".into()),
            order_by: Some("title".into()),
            order_dir: Some("asc".into()),
            per_page: Some("500".into()),
            ..Default::default()
        };
        let validated = query.validate().unwrap();
        assert_eq!(validated.search.query, "example");
        assert!(validated.search.search_title);
        assert!(!validated.search.search_description);
        assert!(validated.search.broken_only);
        assert_eq!(
            validated.search.only_list_ids.into_iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(validated.per_page, Some(MAX_PER_PAGE));
    }

    #[test]
    fn test_search_rejects_bad_ids() {
        let query = SearchQuery {
            query: Some("x".into()),
            only_lists: Some("1,a".into()),
            only_tags: Some("-3".into()),
            ..Default::default()
        };
        let errors = errors_of(query.validate());
        assert!(errors.has("only_lists"));
        assert!(errors.has("only_tags"));
        assert!(!errors.has("query"));
    }

    #[test]
    fn test_parse_tag_input() {
        assert_eq!(
            parse_tag_input("3, rust ,,3,Web Dev"),
            vec![
                TagRef::Id(3),
                TagRef::Name("Web Dev".into()),
                TagRef::Name("rust".into())
            ]
        );
        assert!(parse_tag_input("").is_empty());
    }

    #[test]
    fn test_link_form_validation() {
        let form = LinkForm {
            url: Some("https://example.com".into()),
            tags: Some("1,news".into()),
            ..Default::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.url, "https://example.com");
        assert_eq!(input.lists, Some(vec![]));
        assert_eq!(input.tags.map(|t| t.len()), Some(2));
        assert_eq!(input.is_private, None);

        let bad = LinkForm {
            url: Some("javascript:alert(1)".into()),
            lists: Some("x".into()),
            is_private: Some("perhaps".into()),
            ..Default::default()
        };
        let errors = errors_of(bad.validate());
        assert!(errors.has("url"));
        assert!(errors.has("lists"));
        assert!(errors.has("is_private"));

        assert!(errors_of(LinkForm::default().validate()).has("url"));
    }

    #[test]
    fn test_api_payload_keeps_missing_relations() {
        let payload: ApiLinkPayload = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "tags": [1, "rust"]
        }))
        .unwrap();
        let input = payload.validate().unwrap();
        assert!(input.lists.is_none());
        assert_eq!(
            input.tags,
            Some(vec![TagRef::Id(1), TagRef::Name("rust".into())])
        );
    }

    #[test]
    fn test_collection_form() {
        let form = CollectionForm {
            name: Some(" Reading ".into()),
            is_private: Some("0".into()),
            ..Default::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.name, "Reading");
        assert_eq!(input.is_private, Some(false));

        assert!(errors_of(CollectionForm::default().validate()).has("name"));
        let long = CollectionForm {
            name: Some("a".repeat(256)),
            ..Default::default()
        };
        assert!(errors_of(long.validate()).has("name"));
    }

    #[test]
    fn test_toggle_form() {
        let on = ToggleCheckForm {
            toggle: Some("1".into()),
        };
        assert!(on.validate().unwrap());
        assert!(errors_of(ToggleCheckForm::default().validate()).has("toggle"));
    }

    #[test]
    fn test_settings_form() {
        let form = SettingsForm {
            listitem_count: Some("50".into()),
            links_private_default: Some("on".into()),
            ..Default::default()
        };
        let (settings, guest) = form.validate().unwrap();
        assert_eq!(settings.listitem_count, Some(50));
        assert!(settings.links_private_default);
        assert!(!settings.lists_private_default);
        assert!(!guest);

        let bad = SettingsForm {
            listitem_count: Some("1000".into()),
            ..Default::default()
        };
        assert!(errors_of(bad.validate()).has("listitem_count"));
    }
}
