//! Logging system initialization
//!
//! 根据 `[logging]` 配置初始化 tracing 订阅者：控制台或文件输出，
//! 文件模式下可按天滚动，格式为 text 或 json。

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::errors::{LinkaceError, Result};

/// 创建日志输出目标
fn build_writer(config: &LoggingConfig) -> Result<Box<dyn std::io::Write + Send + Sync>> {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("linkace.log");
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups as usize)
            .build(dir)
            .map_err(|e| {
                LinkaceError::file_operation(format!("Failed to create rolling log appender: {}", e))
            })?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        Ok(Box::new(file))
    }
}

/// Initialize logging system based on configuration
///
/// **Note**: call once during startup. The returned guard must live until
/// the process exits so buffered log lines get flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    // RUST_LOG 优先于配置文件
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.clone()));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.file.as_ref().is_none_or(|f| f.is_empty()));

    let installed = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };

    installed.map_err(|e| {
        LinkaceError::file_operation(format!("Failed to install log subscriber: {}", e))
    })?;

    Ok(guard)
}
