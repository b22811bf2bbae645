//! JSON API（`/api/v1`），使用 Bearer API token 认证

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use crate::api::forms::{ApiLinkPayload, ListingQuery, SearchQuery};
use crate::api::helpers::{ApiError, ApiResult};
use crate::api::middleware::CurrentUser;
use crate::errors::LinkaceError;
use crate::services::AppServices;
use crate::storage::OwnerScope;

type Services = web::Data<AppServices>;

/// 请求体无法解析时同样返回 422 校验错误
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            debug!("Rejected JSON body: {}", err);
            ApiError(LinkaceError::validation(
                "body",
                format!("The request body is invalid: {}", err),
            ))
            .into()
        })
}

pub async fn search_links(
    user: CurrentUser,
    services: Services,
    query: web::Query<SearchQuery>,
) -> ApiResult {
    let validated = query.validate()?;
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
    Ok(HttpResponse::Ok().json(results))
}

pub async fn links_index(
    user: CurrentUser,
    services: Services,
    query: web::Query<ListingQuery>,
) -> ApiResult {
    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let links = services
        .links
        .index(OwnerScope::User(user.id()), query.order(), page)
        .await?;
    Ok(HttpResponse::Ok().json(links))
}

pub async fn links_store(
    user: CurrentUser,
    services: Services,
    payload: web::Json<ApiLinkPayload>,
) -> ApiResult {
    let input = payload.into_inner().validate()?;
    let created = services.links.create(user.id(), input).await?;
    Ok(HttpResponse::Ok().json(created))
}

pub async fn links_show(user: CurrentUser, services: Services, path: web::Path<i32>) -> ApiResult {
    let details = services
        .links
        .show(OwnerScope::User(user.id()), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(details))
}

pub async fn links_update(
    user: CurrentUser,
    services: Services,
    path: web::Path<i32>,
    payload: web::Json<ApiLinkPayload>,
) -> ApiResult {
    let input = payload.into_inner().validate()?;
    let details = services
        .links
        .update(user.id(), path.into_inner(), input)
        .await?;
    Ok(HttpResponse::Ok().json(details))
}

pub async fn links_destroy(
    user: CurrentUser,
    services: Services,
    path: web::Path<i32>,
) -> ApiResult {
    services.links.delete(user.id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn lists_index(
    user: CurrentUser,
    services: Services,
    query: web::Query<ListingQuery>,
) -> ApiResult {
    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let lists = services
        .lists
        .index(OwnerScope::User(user.id()), page)
        .await?;
    Ok(HttpResponse::Ok().json(lists))
}

pub async fn tags_index(
    user: CurrentUser,
    services: Services,
    query: web::Query<ListingQuery>,
) -> ApiResult {
    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let tags = services
        .tags
        .index(OwnerScope::User(user.id()), page)
        .await?;
    Ok(HttpResponse::Ok().json(tags))
}
