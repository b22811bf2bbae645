use sea_orm::{EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select};

use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::models::{PageRequest, Paginated};

impl SeaOrmStorage {
    /// 统计总数并取出一页，两步都走重试
    pub(super) async fn fetch_page<E, T>(
        &self,
        name: &str,
        select: Select<E>,
        request: PageRequest,
        convert: fn(E::Model) -> T,
    ) -> Result<Paginated<T>>
    where
        E: EntityTrait,
        E::Model: FromQueryResult + Send + Sync,
    {
        let db = &self.db;

        let total = self
            .retry
            .run(&format!("{}(count)", name), || {
                let query = select.clone();
                async move { query.count(db).await }
            })
            .await?;

        let models = self
            .retry
            .run(&format!("{}(data)", name), || {
                let query = select
                    .clone()
                    .offset(request.offset())
                    .limit(request.per_page);
                async move { query.all(db).await }
            })
            .await?;

        Ok(Paginated::new(
            models.into_iter().map(convert).collect(),
            total,
            request,
        ))
    }
}
