pub mod password;
pub mod url_validator;

pub use password::{hash_password, verify_password};
pub use url_validator::{url_host, validate_url, validation_error_message};

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 解析逗号分隔的 ID 列表（如 `1,2, 3`）
///
/// 空字符串返回空列表；任一项不是正整数时返回 None。
pub fn parse_id_list(raw: &str) -> Option<Vec<i32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<i32>() {
            Ok(id) if id > 0 => ids.push(id),
            _ => return None,
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Some(ids)
}

/// 解析表单中的布尔值：`1` / `true` / `on` / `yes` 为真
pub fn parse_form_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code() {
        let code = generate_random_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_random_code(32));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(""), Some(vec![]));
        assert_eq!(parse_id_list("3, 1,3"), Some(vec![1, 3]));
        assert_eq!(parse_id_list("1,,2,"), Some(vec![1, 2]));
        assert_eq!(parse_id_list("1,abc"), None);
        assert_eq!(parse_id_list("0"), None);
        assert_eq!(parse_id_list("-4"), None);
    }

    #[test]
    fn test_parse_form_bool() {
        assert_eq!(parse_form_bool("1"), Some(true));
        assert_eq!(parse_form_bool("ON"), Some(true));
        assert_eq!(parse_form_bool("0"), Some(false));
        assert_eq!(parse_form_bool(""), Some(false));
        assert_eq!(parse_form_bool("maybe"), None);
    }
}
