//! 用户账号：创建、密码登录和 API token 校验

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::errors::{LinkaceError, Result, ValidationErrors};
use crate::storage::{SeaOrmStorage, User};
use crate::utils::{generate_random_code, hash_password, verify_password};

pub const API_TOKEN_LENGTH: usize = 48;

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 创建用户，返回用户和明文 API token
    pub async fn create(&self, name: &str, email: &str, password: &str) -> Result<(User, String)> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        let mut errors = ValidationErrors::new();
        if name.is_empty() {
            errors.add("name", "The name field is required.");
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            errors.add("email", "The email must be a valid email address.");
        }
        errors.into_result(())?;

        let hash = hash_password(password)?;
        let token = generate_random_code(API_TOKEN_LENGTH);
        let user = self.storage.create_user(name, &email, &hash, &token).await?;
        info!("UserService: user {} <{}> created", user.id, user.email);
        Ok((user, token))
    }

    /// 邮箱 + 密码登录
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.storage.find_user_by_email(&email).await? else {
            info!("UserService: login failed for unknown email");
            return Err(failed_login());
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => {
                info!("UserService: wrong password for user {}", user.id);
                Err(failed_login())
            }
            Err(e) => {
                warn!("UserService: user {} has an unusable password hash: {}", user.id, e);
                Err(failed_login())
            }
        }
    }

    pub async fn find(&self, id: i32) -> Result<Option<User>> {
        self.storage.find_user(id).await
    }

    /// Bearer token 认证
    pub async fn find_by_api_token(&self, token: &str) -> Result<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }
        let user = self.storage.find_user_by_api_token(token).await?;
        Ok(user.filter(|u| bool::from(u.api_token.as_bytes().ct_eq(token.as_bytes()))))
    }
}

fn failed_login() -> LinkaceError {
    LinkaceError::validation("email", "These credentials do not match our records.")
}
