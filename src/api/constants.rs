//! API 模块常量定义
//!
//! Cookie 名称和认证相关的固定值。

/// 登录会话 Cookie 名称
pub const SESSION_COOKIE_NAME: &str = "linkace_session";

/// 一次性提示消息 Cookie 名称
pub const FLASH_COOKIE_NAME: &str = "linkace_flash";

/// 未登录时浏览器被重定向到的地址
pub const LOGIN_PATH: &str = "/login";

/// 表单中覆盖 HTTP 方法的字段
pub const METHOD_FIELD: &str = "_method";
