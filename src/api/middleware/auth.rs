use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, LOCATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, error, trace};

use crate::api::constants::{LOGIN_PATH, SESSION_COOKIE_NAME};
use crate::api::helpers::error_from_linkace;
use crate::api::session::get_session_service;
use crate::errors::LinkaceError;
use crate::services::AppServices;
use crate::storage::User;

/// 认证方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    /// 会话 Cookie（浏览器页面），失败时重定向到登录页
    Session,
    /// `Authorization: Bearer <api_token>`（JSON API），失败时返回 401
    ApiToken,
}

/// 已认证的用户，由认证中间件放入 request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = LinkaceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| LinkaceError::unauthorized("Unauthenticated.")),
        )
    }
}

/// 会话 Cookie 对应的用户（不强制登录，用于访客页面）
pub async fn session_user(req: &HttpRequest, services: &AppServices) -> Option<User> {
    let token = req.cookie(SESSION_COOKIE_NAME)?;
    let user_id = get_session_service()
        .validate(token.value())
        .ok()?
        .user_id()?;
    services.users.find(user_id).await.ok().flatten()
}

/// 认证中间件
#[derive(Clone)]
pub struct AuthGuard {
    method: AuthMethod,
}

impl AuthGuard {
    pub fn session() -> Self {
        Self {
            method: AuthMethod::Session,
        }
    }

    pub fn api_token() -> Self {
        Self {
            method: AuthMethod::ApiToken,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service: Rc::new(service),
            method: self.method,
        }))
    }
}

pub struct AuthGuardMiddleware<S> {
    service: Rc<S>,
    method: AuthMethod,
}

impl<S, B> AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_unauthenticated(
        req: ServiceRequest,
        method: AuthMethod,
    ) -> ServiceResponse<EitherBody<B>> {
        let response = match method {
            AuthMethod::Session => HttpResponse::SeeOther()
                .insert_header((LOCATION, LOGIN_PATH))
                .finish(),
            AuthMethod::ApiToken => {
                error_from_linkace(&LinkaceError::unauthorized("Unauthenticated."))
            }
        };
        req.into_response(response.map_into_right_body())
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
    }

    fn session_user_id(req: &ServiceRequest) -> Option<i32> {
        let token = req.cookie(SESSION_COOKIE_NAME)?;
        match get_session_service().validate(token.value()) {
            Ok(claims) => claims.user_id(),
            Err(e) => {
                debug!("Session validation failed: {}", e);
                None
            }
        }
    }

    async fn resolve_user(
        req: &ServiceRequest,
        method: AuthMethod,
    ) -> Result<Option<User>, LinkaceError> {
        let Some(services) = req.app_data::<web::Data<AppServices>>() else {
            error!("AppServices missing from app data");
            return Ok(None);
        };
        match method {
            AuthMethod::Session => match Self::session_user_id(req) {
                Some(id) => services.users.find(id).await,
                None => Ok(None),
            },
            AuthMethod::ApiToken => match Self::extract_bearer_token(req) {
                Some(token) => services.users.find_by_api_token(&token).await,
                None => Ok(None),
            },
        }
    }
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let method = self.method;

        Box::pin(async move {
            match Self::resolve_user(&req, method).await {
                Ok(Some(user)) => {
                    trace!("Authenticated user {} via {:?}", user.id, method);
                    req.extensions_mut().insert(CurrentUser(user));
                    let response = srv.call(req).await?.map_into_left_body();
                    Ok(response)
                }
                Ok(None) => {
                    debug!("Unauthenticated request to {}", req.path());
                    Ok(Self::handle_unauthenticated(req, method))
                }
                Err(e) => {
                    let response = match method {
                        AuthMethod::ApiToken => error_from_linkace(&e),
                        AuthMethod::Session => actix_web::ResponseError::error_response(&e),
                    };
                    Ok(req.into_response(response.map_into_right_body()))
                }
            }
        })
    }
}
