use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::info;

use migration::entities::user;

use super::SeaOrmStorage;
use super::converters::model_to_user;
use crate::errors::{LinkaceError, Result};
use crate::storage::models::User;

impl SeaOrmStorage {
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        api_token: &str,
    ) -> Result<User> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(LinkaceError::validation(
                "email",
                "The email has already been taken.",
            ));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password: Set(password_hash.to_string()),
            api_token: Set(api_token.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("User {} created", model.id);
        Ok(model_to_user(model))
    }

    pub async fn find_user(&self, id: i32) -> Result<Option<User>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("find_user({})", id), || async {
                user::Entity::find_by_id(id).one(db).await
            })
            .await?;
        Ok(model.map(model_to_user))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_user))
    }

    /// 按 API token 查找（调用方负责常量时间比较）
    pub async fn find_user_by_api_token(&self, token: &str) -> Result<Option<User>> {
        let db = &self.db;
        let model = self
            .retry
            .run("find_user_by_api_token", || async {
                user::Entity::find()
                    .filter(user::Column::ApiToken.eq(token))
                    .one(db)
                    .await
            })
            .await?;
        Ok(model.map(model_to_user))
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }
}
