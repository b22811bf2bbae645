use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use super::ScheduledTask;
use crate::errors::Result;
use crate::services::TrashService;

/// 清理超过保留期的回收站记录
pub struct TrashCleanupTask {
    trash: Arc<TrashService>,
    retention_days: u32,
}

impl TrashCleanupTask {
    pub fn new(trash: Arc<TrashService>, retention_days: u32) -> Self {
        Self {
            trash,
            retention_days,
        }
    }
}

#[async_trait]
impl ScheduledTask for TrashCleanupTask {
    fn name(&self) -> &'static str {
        "trash_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::hours(24)
    }

    async fn run(&self) -> Result<String> {
        if self.retention_days == 0 {
            return Ok("disabled".to_string());
        }
        let purged = self.trash.purge_older_than(self.retention_days).await?;
        Ok(format!("purged {} records", purged))
    }
}
