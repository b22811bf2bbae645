//! 列表和标签页面
//!
//! 两类页面结构相同，处理函数按 `CollectionKind` 分派到对应服务。

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;

use super::pages::{CollectionFormView, CollectionView, FormMethod};
use crate::api::flash::{self, FlashMessage};
use crate::api::forms::{CollectionForm, ListingQuery};
use crate::api::middleware::CurrentUser;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::services::{AppServices, CollectionInput};
use crate::storage::{CollectionKind, OwnerScope, PageRequest, Paginated};
use crate::views::{Pager, Views};

type Services = web::Data<AppServices>;
type ViewsData = web::Data<Views>;

fn template(kind: CollectionKind, page: &str) -> String {
    format!("{}s/{}.html", kind.as_ref(), page)
}

async fn paginate(
    services: &AppServices,
    kind: CollectionKind,
    scope: OwnerScope,
    page: PageRequest,
) -> Result<Paginated<CollectionView>> {
    match kind {
        CollectionKind::List => Ok(services.lists.index(scope, page).await?.map(Into::into)),
        CollectionKind::Tag => Ok(services.tags.index(scope, page).await?.map(Into::into)),
    }
}

pub(super) async fn find(
    services: &AppServices,
    kind: CollectionKind,
    scope: OwnerScope,
    id: i32,
) -> Result<CollectionView> {
    match kind {
        CollectionKind::List => Ok(services.lists.show(scope, id).await?.into()),
        CollectionKind::Tag => Ok(services.tags.show(scope, id).await?.into()),
    }
}

async fn save(
    services: &AppServices,
    kind: CollectionKind,
    user_id: i32,
    id: Option<i32>,
    input: CollectionInput,
) -> Result<CollectionView> {
    match (kind, id) {
        (CollectionKind::List, None) => Ok(services.lists.create(user_id, input).await?.into()),
        (CollectionKind::List, Some(id)) => {
            Ok(services.lists.update(user_id, id, input).await?.into())
        }
        (CollectionKind::Tag, None) => Ok(services.tags.create(user_id, input).await?.into()),
        (CollectionKind::Tag, Some(id)) => Ok(services.tags.update(user_id, id, input).await?.into()),
    }
}

async fn index(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    query: web::Query<ListingQuery>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let items = paginate(&services, kind, OwnerScope::User(user.id()), page).await?;

    let mut ctx = Context::new();
    ctx.insert("pager", &Pager::new(&items, &format!("/{}s", kind.as_ref()), &[]));
    ctx.insert("page", &items);
    views.page(&req, Some(&user.0), &template(kind, "index"), ctx)
}

async fn show(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    id: i32,
    query: web::Query<ListingQuery>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let scope = OwnerScope::User(user.id());
    let item = find(&services, kind, scope, id).await?;

    let page = services
        .links
        .page_request(Some(user.id()), query.page(), query.per_page())
        .await?;
    let links = match kind {
        CollectionKind::List => services.links.in_list(scope, id, query.order(), page).await?,
        CollectionKind::Tag => services.links.with_tag(scope, id, query.order(), page).await?,
    };

    let mut ctx = Context::new();
    ctx.insert("item", &item);
    ctx.insert("links", &links.data);
    ctx.insert(
        "pager",
        &Pager::new(&links, &format!("/{}s/{}", kind.as_ref(), id), &[]),
    );
    views.page(&req, Some(&user.0), &template(kind, "show"), ctx)
}

#[allow(clippy::too_many_arguments)]
async fn render_form(
    req: &HttpRequest,
    user: &CurrentUser,
    views: &Views,
    kind: CollectionKind,
    id: Option<i32>,
    form: CollectionFormView,
    errors: ValidationErrors,
) -> Result<HttpResponse> {
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let mut ctx = Context::new();
    ctx.insert("kind", kind.as_ref());
    ctx.insert("item_id", &id);
    ctx.insert("form", &form);
    ctx.insert("errors", &errors);
    views.page_with_status(req, Some(&user.0), &template(kind, "form"), ctx, status)
}

fn form_echo(form: &CollectionForm) -> CollectionFormView {
    CollectionFormView {
        name: form.name.clone().unwrap_or_default(),
        description: form.description.clone().unwrap_or_default(),
        is_private: form
            .is_private
            .as_deref()
            .and_then(crate::utils::parse_form_bool)
            .unwrap_or(false),
    }
}

async fn create(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let defaults = services.settings.user_settings(user.id()).await?;
    let form = CollectionFormView {
        is_private: match kind {
            CollectionKind::List => defaults.lists_private_default,
            CollectionKind::Tag => defaults.tags_private_default,
        },
        ..Default::default()
    };
    render_form(&req, &user, &views, kind, None, form, ValidationErrors::new()).await
}

async fn store(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    form: web::Form<CollectionForm>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let result = match form.validate() {
        Ok(input) => save(&services, kind, user.id(), None, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(item) => {
            let location = if form.reload_view() {
                format!("/{}s/create", kind.as_ref())
            } else {
                format!("/{}s/{}", kind.as_ref(), item.id)
            };
            Ok(flash::redirect(
                &location,
                vec![FlashMessage::success(format!(
                    "{} added successfully.",
                    kind.label()
                ))],
            ))
        }
        Err(LinkaceError::Validation(errors)) => {
            render_form(&req, &user, &views, kind, None, form_echo(&form), errors).await
        }
        Err(e) => Err(e),
    }
}

async fn edit(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    id: i32,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let item = find(&services, kind, OwnerScope::User(user.id()), id).await?;
    let form = CollectionFormView {
        name: item.name,
        description: item.description.unwrap_or_default(),
        is_private: item.is_private,
    };
    render_form(&req, &user, &views, kind, Some(id), form, ValidationErrors::new()).await
}

async fn update(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    id: i32,
    form: web::Form<CollectionForm>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    let result = match form.validate() {
        Ok(input) => save(&services, kind, user.id(), Some(id), input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(item) => Ok(flash::redirect(
            &format!("/{}s/{}", kind.as_ref(), item.id),
            vec![FlashMessage::success(format!(
                "{} updated successfully.",
                kind.label()
            ))],
        )),
        Err(LinkaceError::Validation(errors)) => {
            render_form(&req, &user, &views, kind, Some(id), form_echo(&form), errors).await
        }
        Err(e) => Err(e),
    }
}

async fn destroy(
    user: CurrentUser,
    services: Services,
    id: i32,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    match kind {
        CollectionKind::List => services.lists.delete(user.id(), id).await?,
        CollectionKind::Tag => services.tags.delete(user.id(), id).await?,
    }
    Ok(flash::redirect(
        &format!("/{}s", kind.as_ref()),
        vec![FlashMessage::warning(format!(
            "{} was moved to the trash.",
            kind.label()
        ))],
    ))
}

async fn dispatch(
    req: HttpRequest,
    user: CurrentUser,
    services: Services,
    views: ViewsData,
    id: i32,
    form: web::Form<CollectionForm>,
    kind: CollectionKind,
) -> Result<HttpResponse> {
    match FormMethod::parse(form.method.as_deref()) {
        Some(FormMethod::Patch) => update(req, user, services, views, id, form, kind).await,
        Some(FormMethod::Delete) => destroy(user, services, id, kind).await,
        None => Ok(HttpResponse::MethodNotAllowed().finish()),
    }
}

/// 为列表或标签生成一组路由处理函数
macro_rules! collection_handlers {
    ($module:ident, $kind:expr) => {
        pub mod $module {
            use super::*;

            pub async fn index(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                query: web::Query<ListingQuery>,
            ) -> Result<HttpResponse> {
                super::index(req, user, services, views, query, $kind).await
            }

            pub async fn create(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
            ) -> Result<HttpResponse> {
                super::create(req, user, services, views, $kind).await
            }

            pub async fn store(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                form: web::Form<CollectionForm>,
            ) -> Result<HttpResponse> {
                super::store(req, user, services, views, form, $kind).await
            }

            pub async fn show(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                path: web::Path<i32>,
                query: web::Query<ListingQuery>,
            ) -> Result<HttpResponse> {
                super::show(req, user, services, views, path.into_inner(), query, $kind).await
            }

            pub async fn edit(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                path: web::Path<i32>,
            ) -> Result<HttpResponse> {
                super::edit(req, user, services, views, path.into_inner(), $kind).await
            }

            pub async fn update(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                path: web::Path<i32>,
                form: web::Form<CollectionForm>,
            ) -> Result<HttpResponse> {
                super::update(req, user, services, views, path.into_inner(), form, $kind).await
            }

            pub async fn destroy(
                user: CurrentUser,
                services: Services,
                path: web::Path<i32>,
            ) -> Result<HttpResponse> {
                super::destroy(user, services, path.into_inner(), $kind).await
            }

            pub async fn dispatch(
                req: HttpRequest,
                user: CurrentUser,
                services: Services,
                views: ViewsData,
                path: web::Path<i32>,
                form: web::Form<CollectionForm>,
            ) -> Result<HttpResponse> {
                super::dispatch(req, user, services, views, path.into_inner(), form, $kind).await
            }
        }
    };
}

collection_handlers!(lists, CollectionKind::List);
collection_handlers!(tags, CollectionKind::Tag);
