//! 登录密码的 Argon2id 哈希与校验

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::LinkaceError;

/// 新密码的最小长度
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug)]
pub enum PasswordError {
    TooShort(usize),
    Hash(String),
    MalformedHash(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort(min) => write!(f, "The password must be at least {} characters.", min),
            Self::Hash(msg) => write!(f, "Password hash error: {}", msg),
            Self::MalformedHash(msg) => write!(f, "Stored password hash is malformed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

impl From<PasswordError> for LinkaceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort(_) => LinkaceError::validation("password", err.to_string()),
            other => LinkaceError::serialization(other.to_string()),
        }
    }
}

/// 校验长度后哈希新密码
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort(MIN_PASSWORD_LENGTH));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// 密码与存储的哈希是否匹配；哈希本身损坏时返回错误
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        let err = hash_password("short").unwrap_err();
        assert!(matches!(err, PasswordError::TooShort(8)));

        let err: LinkaceError = err.into();
        assert!(err.validation_errors().unwrap().has("password"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("secret-password", "not-a-hash"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
