use std::collections::BTreeMap;
use std::fmt;

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// 按字段分组的校验错误
///
/// 序列化为 `{ "field": ["message", ...] }`，与表单回显和 API 422 响应共用。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// 没有错误时返回 Ok(value)
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(LinkaceError::Validation(self))
        }
    }

    /// 第一条错误信息，用于日志和简洁输出
    pub fn first_message(&self) -> Option<String> {
        self.0
            .iter()
            .next()
            .and_then(|(field, msgs)| msgs.first().map(|m| format!("{}: {}", field, m)))
    }
}

#[derive(Debug, Clone)]
pub enum LinkaceError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(ValidationErrors),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Serialization(String),
    Template(String),
    Scheduler(String),
}

impl LinkaceError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkaceError::DatabaseConfig(_) => "E001",
            LinkaceError::DatabaseConnection(_) => "E002",
            LinkaceError::DatabaseOperation(_) => "E003",
            LinkaceError::FileOperation(_) => "E004",
            LinkaceError::Validation(_) => "E005",
            LinkaceError::NotFound(_) => "E006",
            LinkaceError::Unauthorized(_) => "E007",
            LinkaceError::Forbidden(_) => "E008",
            LinkaceError::Serialization(_) => "E009",
            LinkaceError::Template(_) => "E010",
            LinkaceError::Scheduler(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkaceError::DatabaseConfig(_) => "Database Configuration Error",
            LinkaceError::DatabaseConnection(_) => "Database Connection Error",
            LinkaceError::DatabaseOperation(_) => "Database Operation Error",
            LinkaceError::FileOperation(_) => "File Operation Error",
            LinkaceError::Validation(_) => "Validation Error",
            LinkaceError::NotFound(_) => "Resource Not Found",
            LinkaceError::Unauthorized(_) => "Unauthorized",
            LinkaceError::Forbidden(_) => "Forbidden",
            LinkaceError::Serialization(_) => "Serialization Error",
            LinkaceError::Template(_) => "Template Error",
            LinkaceError::Scheduler(_) => "Scheduler Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            LinkaceError::Validation(errors) => errors
                .first_message()
                .unwrap_or_else(|| "The given data was invalid.".to_string()),
            LinkaceError::DatabaseConfig(msg)
            | LinkaceError::DatabaseConnection(msg)
            | LinkaceError::DatabaseOperation(msg)
            | LinkaceError::FileOperation(msg)
            | LinkaceError::NotFound(msg)
            | LinkaceError::Unauthorized(msg)
            | LinkaceError::Forbidden(msg)
            | LinkaceError::Serialization(msg)
            | LinkaceError::Template(msg)
            | LinkaceError::Scheduler(msg) => msg.clone(),
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkaceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LinkaceError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkaceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkaceError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式和纯文本响应）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkaceError {}

// 便捷的构造函数
impl LinkaceError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkaceError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkaceError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkaceError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkaceError::FileOperation(msg.into())
    }

    pub fn validation(field: &str, msg: impl Into<String>) -> Self {
        LinkaceError::Validation(ValidationErrors::single(field, msg))
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkaceError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkaceError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkaceError::Forbidden(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkaceError::Serialization(msg.into())
    }

    pub fn template<T: Into<String>>(msg: T) -> Self {
        LinkaceError::Template(msg.into())
    }

    pub fn scheduler<T: Into<String>>(msg: T) -> Self {
        LinkaceError::Scheduler(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LinkaceError::NotFound(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            LinkaceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkaceError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkaceError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkaceError {
    fn from(err: std::io::Error) -> Self {
        LinkaceError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkaceError {
    fn from(err: serde_json::Error) -> Self {
        LinkaceError::Serialization(err.to_string())
    }
}

impl From<tera::Error> for LinkaceError {
    fn from(err: tera::Error) -> Self {
        // tera 的错误链才包含真正的原因
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        LinkaceError::Template(msg)
    }
}

impl From<ValidationErrors> for LinkaceError {
    fn from(errors: ValidationErrors) -> Self {
        LinkaceError::Validation(errors)
    }
}

/// 浏览器路由的兜底错误页（纯文本）
///
/// API 路由不走这里，见 `api::helpers::error_from_linkace`。
impl actix_web::ResponseError for LinkaceError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        if self.http_status() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self.format_simple());
        }
        actix_web::HttpResponse::build(self.http_status())
            .content_type("text/plain; charset=utf-8")
            .body(self.format_simple())
    }
}

pub type Result<T> = std::result::Result<T, LinkaceError>;
