//! JSON API 帮助函数

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use crate::errors::{LinkaceError, ValidationErrors};

/// API 错误响应体：`{ "message": ..., "errors": { field: [...] } }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

/// 从 LinkaceError 构建 JSON 错误响应
pub fn error_from_linkace(err: &LinkaceError) -> HttpResponse {
    let status = err.http_status();
    let body = match err {
        LinkaceError::Validation(errors) => ErrorBody {
            message: "The given data was invalid.".to_string(),
            errors: Some(errors.clone()),
        },
        LinkaceError::Unauthorized(_) => ErrorBody {
            message: "Unauthenticated.".to_string(),
            errors: None,
        },
        other if status == StatusCode::INTERNAL_SERVER_ERROR => {
            error!("API request failed: {}", other.format_simple());
            ErrorBody {
                message: "Server Error".to_string(),
                errors: None,
            }
        }
        other => ErrorBody {
            message: other.message(),
            errors: None,
        },
    };
    HttpResponse::build(status).json(body)
}

/// API 处理器的错误类型，渲染为 JSON
#[derive(Debug)]
pub struct ApiError(pub LinkaceError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        error_from_linkace(&self.0)
    }
}

impl From<LinkaceError> for ApiError {
    fn from(err: LinkaceError) -> Self {
        ApiError(err)
    }
}

pub type ApiResult = Result<HttpResponse, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_validation_error_body() {
        let err = LinkaceError::validation("query", "The query field is required.");
        let resp = error_from_linkace(&err);
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"]["query"][0], "The query field is required.");
    }

    #[actix_rt::test]
    async fn test_internal_error_hides_details() {
        let resp = error_from_linkace(&LinkaceError::database_operation("disk on fire"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("disk on fire"));
    }
}
