use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumMessage};

/// 重复链接判定方式
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    EnumIter,
    AsRefStr,
    EnumMessage,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DuplicateMatch {
    #[default]
    #[strum(message = "Compare the stored URL verbatim")]
    Exact,
    #[strum(message = "Ignore scheme, host case and trailing slash")]
    Normalized,
}

impl std::str::FromStr for DuplicateMatch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" => Ok(Self::Normalized),
            _ => Err(format!(
                "Invalid duplicate match mode: '{}'. Valid: exact, normalized",
                s
            )),
        }
    }
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含基础设施配置：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - auth: 会话 Cookie 配置
/// - app / links / scheduler: 业务默认值
///
/// 用户级和系统级的可编辑设置存储在数据库中，通过 SettingsService 读取。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LINKACE，分隔符：__
    /// 示例：LINKACE__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("LINKACE")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 会话认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT 签名密钥，为空时启动期随机生成（重启后会话失效）
    #[serde(default)]
    pub session_secret: String,
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

/// 应用默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 用户未设置 listitem_count 时的分页大小
    #[serde(default = "default_pagination_limit")]
    pub pagination_limit: u64,
    /// 首次启动写入的 guest_access 初始值
    #[serde(default)]
    pub guest_access_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinksConfig {
    #[serde(default)]
    pub duplicate_match: DuplicateMatch,
}

/// 定时任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_batch_size")]
    pub check_batch_size: u64,
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    /// 0 表示不清理回收站
    #[serde(default)]
    pub trash_retention_days: u32,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "linkace.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_session_minutes() -> u64 {
    60 * 24 * 7
}

fn default_pagination_limit() -> u64 {
    24
}

fn default_check_batch_size() -> u64 {
    100
}

fn default_check_timeout_secs() -> u64 {
    10
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_minutes: default_session_minutes(),
            cookie_secure: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pagination_limit: default_pagination_limit(),
            guest_access_default: false,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_batch_size: default_check_batch_size(),
            check_timeout_secs: default_check_timeout_secs(),
            trash_retention_days: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.database_url, "linkace.db");
        assert_eq!(config.auth.session_minutes, 10080);
        assert_eq!(config.app.pagination_limit, 24);
        assert_eq!(config.links.duplicate_match, DuplicateMatch::Exact);
        assert_eq!(config.scheduler.check_batch_size, 100);
        assert_eq!(config.scheduler.trash_retention_days, 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StaticConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [links]
            duplicate_match = "normalized"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.links.duplicate_match, DuplicateMatch::Normalized);
        assert_eq!(config.scheduler.check_timeout_secs, 10);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.database.pool_size, 10);
    }

    #[test]
    fn test_duplicate_match_from_str() {
        assert_eq!(
            "Normalized".parse::<DuplicateMatch>().unwrap(),
            DuplicateMatch::Normalized
        );
        assert!("fuzzy".parse::<DuplicateMatch>().is_err());
        assert_eq!(DuplicateMatch::Exact.as_ref(), "exact");
    }
}
