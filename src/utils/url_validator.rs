//! 链接 URL 校验
//!
//! 只接受 http / https，脚本类协议直接拒绝。

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(f, "Unsupported protocol: {}", proto),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "data:", "file:", "vbscript:", "blob:"];

/// 校验并解析链接地址
pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let lower = raw.to_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(**p)) {
        return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(UrlValidationError::InvalidFormat("missing host".into())),
        other => Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }
}

/// 表单上显示的错误文案
pub fn validation_error_message(error: &UrlValidationError) -> &'static str {
    match error {
        UrlValidationError::EmptyUrl => "The url field is required.",
        _ => "The url format is invalid.",
    }
}

/// 没有标题时用主机名代替
pub fn url_host(raw: &str) -> Option<String> {
    Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8080/path?x=1").is_ok());
        assert!(validate_url("  HTTPS://Example.com ").is_ok());
    }

    #[test]
    fn test_rejected_urls() {
        assert_eq!(validate_url("   "), Err(UrlValidationError::EmptyUrl));
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            validation_error_message(&UrlValidationError::EmptyUrl),
            "The url field is required."
        );
        assert_eq!(
            validation_error_message(&UrlValidationError::InvalidProtocol("ftp:".into())),
            "The url format is invalid."
        );
    }

    #[test]
    fn test_url_host() {
        assert_eq!(url_host("https://www.example.com/a"), Some("example.com".into()));
        assert_eq!(url_host("http://test.com"), Some("test.com".into()));
        assert_eq!(url_host("nope"), None);
    }
}
