//! settings 表读写
//!
//! user_id 为 NULL 的行是系统级设置。

use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, TransactionTrait,
};
use tracing::debug;

use migration::entities::setting;

use super::SeaOrmStorage;
use crate::errors::Result;

fn owner_condition(user_id: Option<i32>) -> Condition {
    match user_id {
        Some(id) => Condition::all().add(setting::Column::UserId.eq(id)),
        None => Condition::all().add(setting::Column::UserId.is_null()),
    }
}

/// 读后写；系统级行（user_id 为 NULL）不受唯一索引约束，依赖事务内的这次检查
async fn upsert<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
    key: &str,
    value: &str,
) -> Result<()> {
    let existing = setting::Entity::find()
        .filter(owner_condition(user_id))
        .filter(setting::Column::Key.eq(key))
        .one(conn)
        .await?;

    match existing {
        Some(model) => {
            let mut active = model.into_active_model();
            active.value = Set(value.to_string());
            active.update(conn).await?;
        }
        None => {
            setting::ActiveModel {
                user_id: Set(user_id),
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

impl SeaOrmStorage {
    pub async fn get_setting(&self, user_id: Option<i32>, key: &str) -> Result<Option<String>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_setting({})", key), || async {
                setting::Entity::find()
                    .filter(owner_condition(user_id))
                    .filter(setting::Column::Key.eq(key))
                    .one(db)
                    .await
            })
            .await?;
        Ok(model.map(|m| m.value))
    }

    /// 插入或更新一条设置
    pub async fn put_setting(&self, user_id: Option<i32>, key: &str, value: &str) -> Result<()> {
        self.put_settings(user_id, &[(key, value)]).await
    }

    /// 在同一个事务中写入多条设置，任一失败则全部回滚
    pub async fn put_settings(&self, user_id: Option<i32>, entries: &[(&str, &str)]) -> Result<()> {
        let txn = self.db.begin().await?;
        for (key, value) in entries {
            upsert(&txn, user_id, key, value).await?;
        }
        txn.commit().await?;
        debug!("{} setting(s) written (user: {:?})", entries.len(), user_id);
        Ok(())
    }

    /// 某个作用域下的全部设置
    pub async fn settings_for(&self, user_id: Option<i32>) -> Result<BTreeMap<String, String>> {
        let models = setting::Entity::find()
            .filter(owner_condition(user_id))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| (m.key, m.value)).collect())
    }
}
