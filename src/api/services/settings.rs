//! 用户设置与系统设置页面

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::info;

use crate::api::flash::{self, FlashMessage};
use crate::api::forms::SettingsForm;
use crate::api::middleware::CurrentUser;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::services::{AppServices, UserSettings};
use crate::views::Views;

/// 完整的 cron 触发地址
fn cron_url(req: &HttpRequest, token: Option<&str>) -> String {
    match token {
        Some(token) => {
            let info = req.connection_info();
            format!("{}://{}/cron/{}", info.scheme(), info.host(), token)
        }
        None => String::new(),
    }
}

#[allow(clippy::too_many_arguments)]
async fn render(
    req: &HttpRequest,
    user: &CurrentUser,
    services: &AppServices,
    views: &Views,
    settings: &UserSettings,
    listitem_count: String,
    guest_access: bool,
    errors: ValidationErrors,
) -> Result<HttpResponse> {
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let token = services.settings.cron_token().await?;

    let mut ctx = Context::new();
    ctx.insert("settings", settings);
    ctx.insert("listitem_count", &listitem_count);
    ctx.insert("guest_access", &guest_access);
    ctx.insert("api_token", &user.0.api_token);
    ctx.insert("cron_url", &cron_url(req, token.as_deref()));
    ctx.insert("errors", &errors);
    views.page_with_status(req, Some(&user.0), "settings.html", ctx, status)
}

pub async fn show(
    req: HttpRequest,
    user: CurrentUser,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
) -> Result<HttpResponse> {
    let settings = services.settings.user_settings(user.id()).await?;
    let guest_access = services.settings.guest_access().await?;
    let listitem_count = settings
        .listitem_count
        .map(|n| n.to_string())
        .unwrap_or_default();
    render(
        &req,
        &user,
        &services,
        &views,
        &settings,
        listitem_count,
        guest_access,
        ValidationErrors::new(),
    )
    .await
}

pub async fn update(
    req: HttpRequest,
    user: CurrentUser,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    form: web::Form<SettingsForm>,
) -> Result<HttpResponse> {
    match form.validate() {
        Ok((settings, guest_access)) => {
            services
                .settings
                .save_user_settings(user.id(), &settings)
                .await?;
            services.settings.set_guest_access(guest_access).await?;
            info!("Settings updated by user {}", user.id());
            Ok(flash::redirect(
                "/settings",
                vec![FlashMessage::success("Settings successfully updated.")],
            ))
        }
        Err(LinkaceError::Validation(errors)) => {
            let current = services.settings.user_settings(user.id()).await?;
            let guest_access = services.settings.guest_access().await?;
            render(
                &req,
                &user,
                &services,
                &views,
                &current,
                form.listitem_count.clone().unwrap_or_default(),
                guest_access,
                errors,
            )
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn generate_cron_token(services: web::Data<AppServices>) -> Result<HttpResponse> {
    services.settings.regenerate_cron_token().await?;
    Ok(flash::redirect(
        "/settings",
        vec![FlashMessage::success(
            "A new cron token was generated. Update your cron job to use the new URL.",
        )],
    ))
}
