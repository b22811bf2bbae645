//! HTTP 路由
//!
//! 公开路由（登录、cron、访客页面）先注册；`/api/v1` 使用 API token 认证；
//! 其余浏览器页面统一包在会话认证的空前缀 scope 中。

pub mod api_v1;
pub mod auth;
pub mod collections;
pub mod cron;
pub mod guest;
pub mod links;
pub mod pages;
pub mod search;
pub mod settings;
pub mod trash;

use actix_web::web;

use super::middleware::AuthGuard;
use collections::{lists, tags};

/// 登录相关路由
pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(auth::show_login))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::post().to(auth::logout));
}

/// 访客路由 `/guest`
pub fn guest_routes() -> actix_web::Scope {
    web::scope("/guest")
        .route("/links", web::get().to(guest::links))
        .route("/lists/{id:\\d+}", web::get().to(guest::list))
        .route("/tags/{id:\\d+}", web::get().to(guest::tag))
}

/// JSON API 路由 `/api/v1`（认证在注册时包裹）
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api/v1")
        .app_data(api_v1::json_config())
        .route("/search/links", web::get().to(api_v1::search_links))
        .route("/links", web::get().to(api_v1::links_index))
        .route("/links", web::post().to(api_v1::links_store))
        .route("/links/{id:\\d+}", web::get().to(api_v1::links_show))
        .route("/links/{id:\\d+}", web::patch().to(api_v1::links_update))
        .route("/links/{id:\\d+}", web::put().to(api_v1::links_update))
        .route("/links/{id:\\d+}", web::delete().to(api_v1::links_destroy))
        .route("/lists", web::get().to(api_v1::lists_index))
        .route("/tags", web::get().to(api_v1::tags_index))
}

/// 链接页面路由
///
/// HTML 表单只能 POST，`POST /links/{id}` 按 `_method` 分派到更新或删除。
fn link_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/links", web::get().to(links::index))
        .route("/links", web::post().to(links::store))
        .route("/links/create", web::get().to(links::create))
        .route("/links/{id:\\d+}", web::get().to(links::show))
        .route("/links/{id:\\d+}", web::post().to(links::dispatch))
        .route("/links/{id:\\d+}", web::patch().to(links::update))
        .route("/links/{id:\\d+}", web::delete().to(links::destroy))
        .route("/links/{id:\\d+}/edit", web::get().to(links::edit))
        .route(
            "/links/{id:\\d+}/toggle-check",
            web::post().to(links::toggle_check),
        )
        .route(
            "/links/{id:\\d+}/toggle-check",
            web::patch().to(links::toggle_check),
        );
}

macro_rules! collection_routes {
    ($cfg:expr, $prefix:literal, $handlers:ident) => {
        $cfg.route($prefix, web::get().to($handlers::index))
            .route($prefix, web::post().to($handlers::store))
            .route(concat!($prefix, "/create"), web::get().to($handlers::create))
            .route(concat!($prefix, "/{id:\\d+}"), web::get().to($handlers::show))
            .route(concat!($prefix, "/{id:\\d+}"), web::post().to($handlers::dispatch))
            .route(concat!($prefix, "/{id:\\d+}"), web::patch().to($handlers::update))
            .route(concat!($prefix, "/{id:\\d+}"), web::delete().to($handlers::destroy))
            .route(concat!($prefix, "/{id:\\d+}/edit"), web::get().to($handlers::edit))
    };
}

/// 浏览器页面（注册时包裹会话认证）
pub fn browser_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(|| async { pages::redirect("/links") }))
        .configure(link_routes)
        .configure(|cfg| {
            collection_routes!(cfg, "/lists", lists);
        })
        .configure(|cfg| {
            collection_routes!(cfg, "/tags", tags);
        })
        .route("/search", web::get().to(search::search))
        .route("/trash", web::get().to(trash::index))
        .route(
            "/trash/restore/{kind}/{id:\\d+}",
            web::post().to(trash::restore),
        )
        .route("/settings", web::get().to(settings::show))
        .route("/settings", web::post().to(settings::update))
        .route(
            "/settings/generate-cron-token",
            web::post().to(settings::generate_cron_token),
        )
}

/// 注册全部路由，顺序决定匹配优先级
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth_routes)
        .route("/cron/{token}", web::get().to(cron::run))
        .service(guest_routes())
        .service(api_routes().wrap(AuthGuard::api_token()))
        .service(browser_routes().wrap(AuthGuard::session()));
}
