//! 页面渲染
//!
//! Tera 模板在编译期通过 rust-embed 嵌入二进制，启动时一次性加载。

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use rust_embed::Embed;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::api::flash;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::storage::{Paginated, User};

#[derive(Embed)]
#[folder = "templates/"]
struct TemplateAssets;

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut templates = Vec::new();
        for name in TemplateAssets::iter() {
            let Some(file) = TemplateAssets::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned()).map_err(|e| {
                LinkaceError::template(format!("Template {} is not UTF-8: {}", name, e))
            })?;
            templates.push((name.to_string(), source));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        debug!("Loaded {} templates", tera.get_template_names().count());
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }

    /// 渲染完整页面：注入当前用户和一次性提示，并清除提示 Cookie
    pub fn page(
        &self,
        req: &HttpRequest,
        user: Option<&User>,
        name: &str,
        context: Context,
    ) -> Result<HttpResponse> {
        self.page_with_status(req, user, name, context, StatusCode::OK)
    }

    pub fn page_with_status(
        &self,
        req: &HttpRequest,
        user: Option<&User>,
        name: &str,
        mut context: Context,
        status: StatusCode,
    ) -> Result<HttpResponse> {
        let flashes = flash::take(req);
        context.insert("current_user", &user);
        context.insert("flashes", &flashes);
        if !context.contains_key("errors") {
            context.insert("errors", &ValidationErrors::new());
        }

        let body = self.render(name, &context)?;
        let mut builder = HttpResponse::build(status);
        builder.content_type("text/html; charset=utf-8");
        if !flashes.is_empty() {
            builder.cookie(flash::clear_cookie());
        }
        Ok(builder.body(body))
    }
}

/// 分页控件需要的数据
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub current_page: u64,
    pub last_page: u64,
    pub total: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// `params` 为需要保留的其他查询参数
    pub fn new<T>(page: &Paginated<T>, path: &str, params: &[(&str, Option<String>)]) -> Self {
        let url = |n: u64| {
            let mut query: Vec<String> = params
                .iter()
                .filter_map(|(k, v)| {
                    v.as_ref()
                        .map(|v| format!("{}={}", k, urlencoding::encode(v)))
                })
                .collect();
            query.push(format!("page={}", n));
            format!("{}?{}", path, query.join("&"))
        };
        Self {
            current_page: page.current_page,
            last_page: page.last_page,
            total: page.total,
            from: page.from,
            to: page.to,
            previous_url: page.has_previous().then(|| url(page.current_page - 1)),
            next_url: page.has_next().then(|| url(page.current_page + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PageRequest;

    #[test]
    fn test_all_templates_parse() {
        let views = Views::new().unwrap();
        assert!(views.tera.get_template_names().any(|n| n == "layout.html"));
        assert!(views.tera.get_template_names().any(|n| n == "links/index.html"));
    }

    #[test]
    fn test_pager_urls() {
        let page = Paginated::new(vec![1, 2], 6, PageRequest::new(2, 2));
        let pager = Pager::new(
            &page,
            "/search",
            &[("query", Some("a b".into())), ("only_tags", None)],
        );
        assert_eq!(pager.previous_url.as_deref(), Some("/search?query=a%20b&page=1"));
        assert_eq!(pager.next_url.as_deref(), Some("/search?query=a%20b&page=3"));
    }

    #[test]
    fn test_login_page_renders() {
        let views = Views::new().unwrap();
        let mut ctx = Context::new();
        ctx.insert("current_user", &Option::<User>::None);
        ctx.insert("flashes", &Vec::<flash::FlashMessage>::new());
        ctx.insert("errors", &ValidationErrors::new());
        ctx.insert("email", "");
        let html = views.render("auth/login.html", &ctx).unwrap();
        assert!(html.contains("name=\"password\""));
    }
}
