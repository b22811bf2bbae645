use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::errors::Result;
use crate::storage::{EntityKind, SeaOrmStorage, TrashContents};

pub struct TrashService {
    storage: Arc<SeaOrmStorage>,
}

impl TrashService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn contents(&self, user_id: i32) -> Result<TrashContents> {
        self.storage.trash_contents(user_id).await
    }

    pub async fn restore(&self, kind: EntityKind, user_id: i32, id: i32) -> Result<()> {
        self.storage.restore(kind, user_id, id).await
    }

    /// 永久删除超过保留天数的回收站记录；0 天表示不清理
    pub async fn purge_older_than(&self, retention_days: u32) -> Result<u64> {
        if retention_days == 0 {
            return Ok(0);
        }
        let before = Utc::now() - Duration::days(i64::from(retention_days));

        let mut total = 0;
        for kind in [EntityKind::Link, EntityKind::List, EntityKind::Tag] {
            total += self.storage.purge_trashed(kind, before).await?;
        }
        if total > 0 {
            info!(
                "TrashService: purged {} records trashed before {}",
                total, before
            );
        }
        Ok(total)
    }
}
