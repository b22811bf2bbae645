//! 读操作的瞬时错误重试
//!
//! 死锁、锁等待超时、SQLite BUSY 以及连接池获取失败会按指数退避加抖动重试。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否可重试
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => is_transient_runtime(runtime_err),
        _ => false,
    }
}

fn is_transient_runtime(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(code) = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                // MySQL 1213/1205，PostgreSQL 40001/40P01，SQLite BUSY/LOCKED
                return matches!(code.as_ref(), "1213" | "1205" | "40001" | "40P01" | "5" | "6");
            }
            message_looks_transient(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => message_looks_transient(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn message_looks_transient(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }

    /// 第 attempt 次重试前的等待时间（attempt 从 1 开始），附加 0-25% 抖动
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        capped.saturating_add(rand::random_range(0..=capped / 4))
    }

    /// 执行操作，遇到瞬时错误时重试
    pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("'{}' succeeded after {} retries", name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_ms(attempt);
                    warn!(
                        "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                        name,
                        attempt,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
