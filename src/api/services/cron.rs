//! 外部 cron 触发入口：`GET /cron/{token}`

use actix_web::{HttpResponse, web};
use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::errors::Result;
use crate::scheduler::TaskRunner;
use crate::services::AppServices;

fn token_matches(expected: Option<&str>, given: &str) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            bool::from(expected.as_bytes().ct_eq(given.as_bytes()))
        }
        _ => false,
    }
}

pub async fn run(
    services: web::Data<AppServices>,
    runner: web::Data<TaskRunner>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let expected = services.settings.cron_token().await?;
    if !token_matches(expected.as_deref(), &path) {
        warn!("Cron endpoint called with an invalid token");
        return Ok(HttpResponse::Forbidden()
            .content_type("text/plain; charset=utf-8")
            .body("The cron token is invalid"));
    }

    let report = runner.run_due(Utc::now()).await?;
    info!(
        "Cron run finished: {} ran, {} failed",
        report.ran(),
        report.failed()
    );
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(report.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches(Some("abc"), "abc"));
        assert!(!token_matches(Some("abc"), "abd"));
        assert!(!token_matches(Some("abc"), "ab"));
        assert!(!token_matches(None, ""));
        assert!(!token_matches(Some(""), ""));
    }
}
