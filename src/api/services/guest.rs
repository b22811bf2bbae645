//! 访客页面：只展示公开数据，需在系统设置中开启

use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::debug;

use super::collections::find;
use super::pages::redirect;
use crate::api::constants::LOGIN_PATH;
use crate::api::forms::ListingQuery;
use crate::api::middleware::session_user;
use crate::errors::Result;
use crate::services::AppServices;
use crate::storage::{CollectionKind, Link, OwnerScope, Paginated};
use crate::views::{Pager, Views};

fn render(
    req: &HttpRequest,
    views: &Views,
    user: Option<&crate::storage::User>,
    heading: &str,
    description: Option<&str>,
    links: &Paginated<Link>,
    path: &str,
) -> Result<HttpResponse> {
    let mut ctx = Context::new();
    ctx.insert("guest", &true);
    ctx.insert("heading", heading);
    ctx.insert("description", &description.unwrap_or_default());
    ctx.insert("links", &links.data);
    ctx.insert("pager", &Pager::new(links, path, &[]));
    views.page(req, user, "guest/links.html", ctx)
}

pub async fn links(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    if !services.settings.guest_access().await? {
        debug!("Guest access disabled, redirecting to login");
        return Ok(redirect(LOGIN_PATH));
    }
    let user = session_user(&req, &services).await;
    let page = services
        .links
        .page_request(None, query.page(), query.per_page())
        .await?;
    let links = services
        .links
        .index(OwnerScope::Guest, query.order(), page)
        .await?;
    render(&req, &views, user.as_ref(), "Links", None, &links, "/guest/links")
}

async fn collection(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    id: i32,
    query: web::Query<ListingQuery>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    if !services.settings.guest_access().await? {
        return Ok(redirect(LOGIN_PATH));
    }
    let user = session_user(&req, &services).await;
    let item = find(&services, kind, OwnerScope::Guest, id).await?;
    let page = services
        .links
        .page_request(None, query.page(), query.per_page())
        .await?;
    let links = match kind {
        CollectionKind::List => {
            services
                .links
                .in_list(OwnerScope::Guest, id, query.order(), page)
                .await?
        }
        CollectionKind::Tag => {
            services
                .links
                .with_tag(OwnerScope::Guest, id, query.order(), page)
                .await?
        }
    };
    let path = format!("/guest/{}s/{}", kind.as_ref(), id);
    render(
        &req,
        &views,
        user.as_ref(),
        &item.name,
        item.description.as_deref(),
        &links,
        &path,
    )
}

pub async fn list(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    path: web::Path<i32>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    collection(req, services, views, path.into_inner(), query, CollectionKind::List).await
}

pub async fn tag(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    path: web::Path<i32>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    collection(req, services, views, path.into_inner(), query, CollectionKind::Tag).await
}
