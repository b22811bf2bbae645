//! 链接页面

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::info;

use super::pages::{FormMethod, LinkFormView, duplicates_flash, redirect};
use crate::api::flash::{self, FlashMessage};
use crate::api::forms::{LinkForm, ListingQuery, ToggleCheckForm};
use crate::api::middleware::CurrentUser;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::services::AppServices;
use crate::storage::OwnerScope;
use crate::views::{Pager, Views};

type Services = web::Data<AppServices>;
type ViewsData = web::Data<Views>;

pub async fn index(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let links = services
        .links
        .index(OwnerScope::User(user.id()), query.order(), page)
        .await?;

    let pager = Pager::new(
        &links,
        "/links",
        &[
            ("order_by", query.order_by.clone()),
            ("order_dir", query.order_dir.clone()),
        ],
    );
    let mut ctx = Context::new();
    ctx.insert("links", &links.data);
    ctx.insert("pager", &pager);
    views.page(&req, Some(&user.0), "links/index.html", ctx)
}

/// 渲染新建/编辑表单；`link_id` 为空表示新建
async fn render_form(
    req: &HttpRequest,
    user: &CurrentUser,
    services: &AppServices,
    views: &Views,
    link_id: Option<i32>,
    form: LinkFormView,
    errors: ValidationErrors,
) -> Result<HttpResponse> {
    let scope = OwnerScope::User(user.id());
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    let mut ctx = Context::new();
    ctx.insert("link_id", &link_id);
    ctx.insert("form", &form);
    ctx.insert("errors", &errors);
    ctx.insert("all_tags", &services.tags.all(scope).await?);
    ctx.insert("all_lists", &services.lists.all(scope).await?);
    views.page_with_status(req, Some(&user.0), "links/form.html", ctx, status)
}

fn form_echo(form: &LinkForm) -> LinkFormView {
    LinkFormView {
        url: form.url.clone().unwrap_or_default(),
        title: form.title.clone().unwrap_or_default(),
        description: form.description.clone().unwrap_or_default(),
        tags: form.tags.clone().unwrap_or_default(),
        lists: form.lists.clone().unwrap_or_default(),
        is_private: form
            .is_private
            .as_deref()
            .and_then(crate::utils::parse_form_bool)
            .unwrap_or(false),
    }
}

pub async fn create(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
) -> Result<HttpResponse> {
    let defaults = services.settings.user_settings(user.id()).await?;
    let form = LinkFormView {
        is_private: defaults.links_private_default,
        ..Default::default()
    };
    render_form(&req, &user, &services, &views, None, form, ValidationErrors::new()).await
}

pub async fn store(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    form: web::Form<LinkForm>,
) -> Result<HttpResponse> {
    let result = match form.validate() {
        Ok(input) => services.links.create(user.id(), input).await,
        Err(e) => Err(e),
    };

    let created = match result {
        Ok(created) => created,
        Err(LinkaceError::Validation(errors)) => {
            return render_form(&req, &user, &services, &views, None, form_echo(&form), errors)
                .await;
        }
        Err(e) => return Err(e),
    };

    let mut messages = vec![FlashMessage::success("Link added successfully.")];
    messages.extend(duplicates_flash(&created.duplicates));

    let location = if form.reload_view() {
        "/links/create".to_string()
    } else {
        format!("/links/{}", created.link.link.id)
    };
    Ok(flash::redirect(&location, messages))
}

pub async fn show(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let link = services
        .links
        .show(OwnerScope::User(user.id()), path.into_inner())
        .await?;
    let mut ctx = Context::new();
    ctx.insert("link", &link);
    views.page(&req, Some(&user.0), "links/show.html", ctx)
}

pub async fn edit(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let link = services.links.show(OwnerScope::User(user.id()), id).await?;
    let form = LinkFormView::from_details(&link);
    render_form(&req, &user, &services, &views, Some(id), form, ValidationErrors::new()).await
}

pub async fn update(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    path: web::Path<i32>,
    form: web::Form<LinkForm>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let result = match form.validate() {
        Ok(input) => services.links.update(user.id(), id, input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(link) => Ok(flash::redirect(
            &format!("/links/{}", link.link.id),
            vec![FlashMessage::success("Link updated successfully.")],
        )),
        Err(LinkaceError::Validation(errors)) => {
            render_form(&req, &user, &services, &views, Some(id), form_echo(&form), errors).await
        }
        Err(e) => Err(e),
    }
}

pub async fn destroy(
    user: CurrentUser,
    services: Services,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    services.links.delete(user.id(), id).await?;
    info!("Link {} moved to trash by user {}", id, user.id());
    Ok(flash::redirect(
        "/links",
        vec![FlashMessage::warning("Link was moved to the trash.")],
    ))
}

/// HTML 表单只能 POST，按 `_method` 分派
pub async fn dispatch(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    path: web::Path<i32>,
    form: web::Form<LinkForm>,
) -> Result<HttpResponse> {
    match FormMethod::parse(form.method.as_deref()) {
        Some(FormMethod::Patch) => update(req, user, services, views, path, form).await,
        Some(FormMethod::Delete) => destroy(user, services, path).await,
        None => Ok(HttpResponse::MethodNotAllowed().finish()),
    }
}

pub async fn toggle_check(
    user: CurrentUser,
    services: Services,
    path: web::Path<i32>,
    form: web::Form<ToggleCheckForm>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let location = format!("/links/{}", id);
    match form.validate() {
        Ok(disabled) => {
            services
                .links
                .set_check_disabled(user.id(), id, disabled)
                .await?;
            Ok(redirect(&location))
        }
        Err(LinkaceError::Validation(errors)) => Ok(flash::redirect(
            &location,
            vec![FlashMessage::error(
                errors
                    .first_message()
                    .unwrap_or_else(|| "Invalid toggle value.".to_string()),
            )],
        )),
        Err(e) => Err(e),
    }
}
