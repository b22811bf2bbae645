//! 登录与退出

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::{info, warn};

use super::pages::redirect;
use crate::api::flash::{self, FlashMessage};
use crate::api::forms::LoginForm;
use crate::api::middleware::session_user;
use crate::api::session::get_session_service;
use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::services::AppServices;
use crate::views::Views;

fn render_login(
    req: &HttpRequest,
    views: &Views,
    email: &str,
    errors: ValidationErrors,
) -> Result<HttpResponse> {
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let mut ctx = Context::new();
    ctx.insert("email", email);
    ctx.insert("errors", &errors);
    views.page_with_status(req, None, "auth/login.html", ctx, status)
}

pub async fn show_login(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
) -> Result<HttpResponse> {
    if session_user(&req, &services).await.is_some() {
        return Ok(redirect("/links"));
    }
    render_login(&req, &views, "", ValidationErrors::new())
}

pub async fn login(
    req: HttpRequest,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse> {
    let echo = form.email.clone().unwrap_or_default();
    let result = match form.validate() {
        Ok((email, password)) => services.users.authenticate(&email, &password).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => {
            let session = get_session_service();
            let token = session
                .issue(user.id)
                .map_err(|e| LinkaceError::serialization(format!("Failed to issue session: {}", e)))?;
            info!("User {} logged in", user.id);
            let mut response = redirect("/links");
            response
                .add_cookie(&session.session_cookie(token))
                .map_err(|e| LinkaceError::serialization(e.to_string()))?;
            Ok(response)
        }
        Err(LinkaceError::Validation(errors)) => {
            warn!("Failed login attempt");
            render_login(&req, &views, &echo, errors)
        }
        Err(e) => Err(e),
    }
}

pub async fn logout() -> HttpResponse {
    let mut response = flash::redirect(
        "/login",
        vec![FlashMessage::success("You have been logged out.")],
    );
    if let Err(e) = response.add_cookie(&get_session_service().expired_cookie()) {
        warn!("Failed to expire session cookie: {}", e);
    }
    response
}
