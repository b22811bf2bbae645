//! 跨重定向的一次性提示消息
//!
//! 消息以 URL 编码的 JSON 放在 Cookie 中，下一次页面渲染时读出并清除。

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::constants::FLASH_COOKIE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

/// 附带的链接（例如重复 URL 提示中指向已有链接）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashLink {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<FlashLink>,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            links: Vec::new(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message)
    }

    pub fn with_links(mut self, links: Vec<FlashLink>) -> Self {
        self.links = links;
        self
    }
}

fn flash_cookie(value: String, max_age: CookieDuration) -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE_NAME, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(max_age);
    cookie
}

pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}

pub fn decode(raw: &str) -> Vec<FlashMessage> {
    urlencoding::decode(raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// 读取当前请求携带的提示消息
pub fn take(req: &HttpRequest) -> Vec<FlashMessage> {
    req.cookie(FLASH_COOKIE_NAME)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

/// 清除提示消息的 Cookie
pub fn clear_cookie() -> Cookie<'static> {
    flash_cookie(String::new(), CookieDuration::ZERO)
}

/// 303 重定向，附带提示消息
pub fn redirect(location: &str, messages: Vec<FlashMessage>) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((LOCATION, location.to_string()));
    if !messages.is_empty() {
        debug!("Flashing {} messages to {}", messages.len(), location);
        builder.cookie(flash_cookie(encode(&messages), CookieDuration::minutes(5)));
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_encoded_messages() {
        let messages = vec![
            FlashMessage::success("Link added successfully."),
            FlashMessage::warning("Found potential duplicates:").with_links(vec![FlashLink {
                href: "/links/3".into(),
                label: "example.com".into(),
            }]),
        ];
        let raw = encode(&messages);
        assert!(!raw.contains('"'));
        assert_eq!(decode(&raw), messages);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode("%%%not-json").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_redirect_sets_location() {
        let resp = redirect("/links/1", vec![FlashMessage::success("ok")]);
        assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/links/1");
        assert!(resp.cookies().any(|c| c.name() == FLASH_COOKIE_NAME));
    }
}
