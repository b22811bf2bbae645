//! 浏览器搜索页

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tera::Context;

use crate::api::forms::SearchQuery;
use crate::api::middleware::CurrentUser;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::services::AppServices;
use crate::storage::OwnerScope;
use crate::utils::parse_form_bool;
use crate::views::{Pager, Views};

/// 搜索表单回显
#[derive(Debug, Default, Serialize)]
struct SearchFormView {
    query: String,
    search_title: bool,
    search_description: bool,
    private_only: bool,
    broken_only: bool,
    only_lists: String,
    only_tags: String,
}

impl From<&SearchQuery> for SearchFormView {
    fn from(q: &SearchQuery) -> Self {
        let flag = |v: &Option<String>| v.as_deref().and_then(parse_form_bool).unwrap_or(false);
        Self {
            query: q.query.clone().unwrap_or_default(),
            search_title: flag(&q.search_title),
            search_description: flag(&q.search_description),
            private_only: flag(&q.private_only),
            broken_only: flag(&q.broken_only),
            only_lists: q.only_lists.clone().unwrap_or_default(),
            only_tags: q.only_tags.clone().unwrap_or_default(),
        }
    }
}

/// 翻页时需要保留的查询参数
fn carried_params(q: &SearchQuery) -> Vec<(&'static str, Option<String>)> {
    vec![
        ("query", q.query.clone()),
        ("search_title", q.search_title.clone()),
        ("search_description", q.search_description.clone()),
        ("private_only", q.private_only.clone()),
        ("broken_only", q.broken_only.clone()),
        ("only_lists", q.only_lists.clone()),
        ("only_tags", q.only_tags.clone()),
        ("order_by", q.order_by.clone()),
        ("order_dir", q.order_dir.clone()),
        ("per_page", q.per_page.clone()),
    ]
}

pub async fn search(
    req: HttpRequest,
    user: CurrentUser,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let mut ctx = Context::new();
    ctx.insert("form", &SearchFormView::from(&*query));

    // 首次打开搜索页，只显示空表单
    if query.query.is_none() {
        ctx.insert("searched", &false);
        return views.page(&req, Some(&user.0), "search.html", ctx);
    }

    let validated = match query.validate() {
        Ok(v) => v,
        Err(LinkaceError::Validation(errors)) => {
            ctx.insert("searched", &false);
            ctx.insert("errors", &errors);
            return views.page_with_status(
                &req,
                Some(&user.0),
                "search.html",
                ctx,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
        Err(e) => return Err(e),
    };

    let page = services
        .links
        .page_request(Some(user.id()), validated.page, validated.per_page)
        .await?;
    let results = services
        .links
        .search(
            OwnerScope::User(user.id()),
            &validated.search,
            validated.order,
            page,
        )
        .await?;

    let params = carried_params(&query);
    ctx.insert("searched", &true);
    ctx.insert("errors", &ValidationErrors::new());
    ctx.insert("links", &results.data);
    ctx.insert("pager", &Pager::new(&results, "/search", &params));
    views.page(&req, Some(&user.0), "search.html", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_view_echoes_flags() {
        let q = SearchQuery {
            query: Some("rust".into()),
            private_only: Some("1".into()),
            only_tags: Some("1,2".into()),
            ..Default::default()
        };
        let view = SearchFormView::from(&q);
        assert_eq!(view.query, "rust");
        assert!(view.private_only);
        assert!(!view.broken_only);
        assert_eq!(view.only_tags, "1,2");
    }
}
