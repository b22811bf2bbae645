//! 链接健康检查
//!
//! 每次取出最久未检查的一批链接，按响应状态更新 `status`。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, warn};
use ureq::Agent;

use super::ScheduledTask;
use crate::errors::Result;
use crate::storage::{LinkStatus, SeaOrmStorage};

/// 探测一个 URL 的状态
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn probe(&self, url: &str) -> LinkStatus;
}

/// 基于 ureq 的 GET 探测；不跟随重定向，3xx 记为 moved
pub struct HttpProbe {
    agent: Agent,
}

impl HttpProbe {
    pub fn new(timeout_secs: u64) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(StdDuration::from_secs(timeout_secs.max(1))))
            .max_redirects(0)
            .http_status_as_error(false)
            .user_agent("LinkAce link checker")
            .build()
            .into();
        Self { agent }
    }

    fn probe_sync(agent: Agent, url: String) -> LinkStatus {
        match agent.get(&url).call() {
            Ok(resp) => LinkStatus::from_http_status(resp.status().as_u16()),
            Err(e) => {
                debug!("Link check request to \"{}\" failed: {}", url, e);
                LinkStatus::Broken
            }
        }
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn probe(&self, url: &str) -> LinkStatus {
        let agent = self.agent.clone();
        let url = url.to_string();

        // 同步 HTTP 放到阻塞线程池
        tokio::task::spawn_blocking(move || Self::probe_sync(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("Link check spawn_blocking failed: {}", e);
                LinkStatus::Unknown
            })
    }
}

pub struct CheckLinksTask {
    storage: Arc<SeaOrmStorage>,
    probe: Arc<dyn UrlProbe>,
    batch_size: u64,
}

impl CheckLinksTask {
    pub fn new(storage: Arc<SeaOrmStorage>, probe: Arc<dyn UrlProbe>, batch_size: u64) -> Self {
        Self {
            storage,
            probe,
            batch_size,
        }
    }
}

#[async_trait]
impl ScheduledTask for CheckLinksTask {
    fn name(&self) -> &'static str {
        "check_links"
    }

    fn interval(&self) -> Duration {
        Duration::minutes(60)
    }

    async fn run(&self) -> Result<String> {
        let links = self.storage.links_due_for_check(self.batch_size).await?;

        let mut broken = 0;
        let mut moved = 0;
        for link in &links {
            let status = self.probe.probe(&link.url).await;
            match status {
                LinkStatus::Broken => broken += 1,
                LinkStatus::Moved => moved += 1,
                _ => {}
            }
            if status != link.status {
                debug!(
                    "Link {} changed status: {} -> {}",
                    link.id,
                    link.status.label(),
                    status.label()
                );
            }
            self.storage
                .record_link_check(link.id, status, Utc::now())
                .await?;
        }

        Ok(format!(
            "checked {} links ({} moved, {} broken)",
            links.len(),
            moved,
            broken
        ))
    }
}
