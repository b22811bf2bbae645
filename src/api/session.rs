//! 浏览器登录会话
//!
//! 会话是一个 HS256 签名的 JWT，`sub` 为用户 ID，存放在 HttpOnly Cookie 中。

use std::sync::OnceLock;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::constants::SESSION_COOKIE_NAME;
use crate::config::get_config;
use crate::utils::generate_random_code;

static SESSION_SERVICE: OnceLock<SessionService> = OnceLock::new();

/// 全局会话服务，首次使用时按配置初始化
pub fn get_session_service() -> &'static SessionService {
    SESSION_SERVICE.get_or_init(SessionService::from_config)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_minutes: u64,
    cookie_secure: bool,
}

impl SessionService {
    pub fn new(secret: &str, session_minutes: u64, cookie_secure: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_minutes,
            cookie_secure,
        }
    }

    pub fn from_config() -> Self {
        let config = get_config();

        // 未配置密钥时生成随机值，重启后旧会话全部失效
        let secret = if config.auth.session_secret.is_empty() {
            warn!("auth.session_secret is empty, generating a random secret; sessions end on restart");
            generate_random_code(48)
        } else {
            config.auth.session_secret.clone()
        };

        Self::new(&secret, config.auth.session_minutes, config.auth.cookie_secure)
    }

    pub fn issue(&self, user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.session_minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    fn cookie(&self, value: String, max_age: CookieDuration) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE_NAME, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie_secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        cookie
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(token, CookieDuration::minutes(self.session_minutes as i64))
    }

    pub fn expired_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), CookieDuration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> SessionService {
        SessionService::new("test_secret_key_32_bytes_long!!", 60, false)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue(42).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_test_service().issue(1).unwrap();
        let other = SessionService::new("different_secret_key_32_bytes!!", 60, false);
        assert!(other.validate(&token).is_err());
        assert!(other.validate("invalid.token.here").is_err());
    }

    #[test]
    fn test_expired_session_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "1".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!"),
        )
        .unwrap();

        assert!(create_test_service().validate(&token).is_err());
    }

    #[test]
    fn test_cookies() {
        let service = create_test_service();
        let cookie = service.session_cookie("abc".into());
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(service.expired_cookie().max_age(), Some(CookieDuration::ZERO));
    }
}
