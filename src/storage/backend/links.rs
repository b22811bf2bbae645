//! 链接的读写操作

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Func, NullOrdering, Order, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use tracing::{debug, info};

use migration::entities::{link, link_list, link_list_link, link_tag, tag};

use super::converters::{model_to_link, model_to_list, model_to_tag};
use super::relations::{Edge, resolve_list_ids, resolve_tag_refs, sync_edges};
use super::search::{LinkSearch, in_lists, tagged_with};
use super::SeaOrmStorage;
use crate::config::DuplicateMatch;
use crate::errors::{LinkaceError, Result};
use crate::storage::models::{
    Link, LinkDetails, LinkOrder, LinkOrderColumn, LinkStatus, LinkWrite, OrderDirection,
    PageRequest, Paginated,
};
use crate::storage::scope::{OwnerScope, TrashFilter, scoped};

/// 归一化 URL 用于重复判定：去掉协议和末尾斜杠，主机名小写
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(parsed) if parsed.host_str().is_some() => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            let mut out = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            };
            out.push_str(parsed.path().trim_end_matches('/'));
            if let Some(query) = parsed.query() {
                out.push('?');
                out.push_str(query);
            }
            out
        }
        _ => trimmed.trim_end_matches('/').to_lowercase(),
    }
}

fn apply_order(select: Select<link::Entity>, order: LinkOrder) -> Select<link::Entity> {
    let column = match order.column {
        LinkOrderColumn::CreatedAt => link::Column::CreatedAt,
        LinkOrderColumn::UpdatedAt => link::Column::UpdatedAt,
        LinkOrderColumn::Title => link::Column::Title,
        LinkOrderColumn::Url => link::Column::Url,
    };
    let direction = match order.direction {
        OrderDirection::Asc => Order::Asc,
        OrderDirection::Desc => Order::Desc,
    };
    // id 作为次级排序，保证同一时间戳下分页稳定
    select
        .order_by(column, direction.clone())
        .order_by(link::Column::Id, direction)
}

/// 在事务内同步链接的标签和列表
async fn sync_relations<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    link_id: i32,
    write: &LinkWrite,
) -> Result<()> {
    if let Some(refs) = &write.tags {
        let ids = resolve_tag_refs(conn, user_id, refs, write.new_tags_private).await?;
        sync_edges(conn, Edge::Tags, link_id, &ids).await?;
    }
    if let Some(lists) = &write.lists {
        let ids = resolve_list_ids(conn, user_id, lists).await?;
        sync_edges(conn, Edge::Lists, link_id, &ids).await?;
    }
    Ok(())
}

impl SeaOrmStorage {
    pub async fn find_link(
        &self,
        scope: OwnerScope,
        id: i32,
        trash: TrashFilter,
    ) -> Result<Option<Link>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("find_link({})", id), || async {
                link::Entity::find_by_id(id)
                    .filter(scoped::<link::Entity>(scope, trash))
                    .one(db)
                    .await
            })
            .await?;
        Ok(model.map(model_to_link))
    }

    /// 加载链接可见的标签和列表
    pub async fn link_details(&self, scope: OwnerScope, link: Link) -> Result<LinkDetails> {
        let tags = tag::Entity::find()
            .filter(scoped::<tag::Entity>(scope, TrashFilter::Exclude))
            .filter(
                tag::Column::Id.in_subquery(
                    Query::select()
                        .column(link_tag::Column::TagId)
                        .from(link_tag::Entity)
                        .and_where(link_tag::Column::LinkId.eq(link.id))
                        .to_owned(),
                ),
            )
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await?;

        let lists = link_list::Entity::find()
            .filter(scoped::<link_list::Entity>(scope, TrashFilter::Exclude))
            .filter(
                link_list::Column::Id.in_subquery(
                    Query::select()
                        .column(link_list_link::Column::ListId)
                        .from(link_list_link::Entity)
                        .and_where(link_list_link::Column::LinkId.eq(link.id))
                        .to_owned(),
                ),
            )
            .order_by_asc(link_list::Column::Name)
            .all(&self.db)
            .await?;

        Ok(LinkDetails {
            link,
            tags: tags.into_iter().map(model_to_tag).collect(),
            lists: lists.into_iter().map(model_to_list).collect(),
        })
    }

    /// 分页列出链接，extra 为附加条件
    pub async fn paginate_links(
        &self,
        scope: OwnerScope,
        extra: Condition,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        let select = apply_order(
            link::Entity::find()
                .filter(scoped::<link::Entity>(scope, TrashFilter::Exclude))
                .filter(extra),
            order,
        );
        self.fetch_page("paginate_links", select, page, model_to_link)
            .await
    }

    pub async fn search_links(
        &self,
        scope: OwnerScope,
        search: &LinkSearch,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        debug!("Searching links: {:?}", search);
        self.paginate_links(scope, search.condition(), order, page)
            .await
    }

    pub async fn links_in_list(
        &self,
        scope: OwnerScope,
        list_id: i32,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        self.paginate_links(scope, Condition::all().add(in_lists([list_id])), order, page)
            .await
    }

    pub async fn links_with_tag(
        &self,
        scope: OwnerScope,
        tag_id: i32,
        order: LinkOrder,
        page: PageRequest,
    ) -> Result<Paginated<Link>> {
        self.paginate_links(scope, Condition::all().add(tagged_with([tag_id])), order, page)
            .await
    }

    /// 新建链接并同步关系（单个事务）
    pub async fn create_link(&self, user_id: i32, write: &LinkWrite) -> Result<Link> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let model = link::ActiveModel {
            user_id: Set(user_id),
            url: Set(write.url.clone()),
            title: Set(write.title.clone()),
            description: Set(write.description.clone()),
            icon: Set(write.icon.clone()),
            is_private: Set(write.is_private),
            status: Set(LinkStatus::Ok.as_i16()),
            check_disabled: Set(false),
            last_checked_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        sync_relations(&txn, user_id, model.id, write).await?;
        txn.commit().await?;

        info!("Link {} created for user {}", model.id, user_id);
        Ok(model_to_link(model))
    }

    /// 更新链接标量字段并重新同步关系（单个事务，关系校验失败时整体回滚）
    pub async fn update_link(&self, user_id: i32, id: i32, write: &LinkWrite) -> Result<Link> {
        let txn = self.db.begin().await?;

        let existing = link::Entity::find_by_id(id)
            .filter(scoped::<link::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .one(&txn)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("Link {} not found", id)))?;

        let mut active = existing.into_active_model();
        active.url = Set(write.url.clone());
        active.title = Set(write.title.clone());
        active.description = Set(write.description.clone());
        active.icon = Set(write.icon.clone());
        active.is_private = Set(write.is_private);
        active.updated_at = Set(Utc::now());
        let model = active.update(&txn).await?;

        sync_relations(&txn, user_id, id, write).await?;
        txn.commit().await?;

        info!("Link {} updated", id);
        Ok(model_to_link(model))
    }

    pub async fn set_link_check_disabled(
        &self,
        user_id: i32,
        id: i32,
        disabled: bool,
    ) -> Result<Link> {
        let existing = link::Entity::find_by_id(id)
            .filter(scoped::<link::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkaceError::not_found(format!("Link {} not found", id)))?;

        let mut active = existing.into_active_model();
        active.check_disabled = Set(disabled);
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await?;
        Ok(model_to_link(model))
    }

    /// 查找同一用户下 URL 重复的未删除链接
    pub async fn find_duplicate_links(
        &self,
        user_id: i32,
        url: &str,
        exclude_id: i32,
        mode: DuplicateMatch,
    ) -> Result<Vec<Link>> {
        let base = link::Entity::find()
            .filter(scoped::<link::Entity>(
                OwnerScope::User(user_id),
                TrashFilter::Exclude,
            ))
            .filter(link::Column::Id.ne(exclude_id))
            .order_by_asc(link::Column::Id);

        let models = match mode {
            DuplicateMatch::Exact => base.filter(link::Column::Url.eq(url)).all(&self.db).await?,
            DuplicateMatch::Normalized => {
                let wanted = normalize_url(url);
                // 先按主机名粗筛，再在内存中精确比较
                let host = wanted.split(['/', '?']).next().unwrap_or_default().to_string();
                base.filter(
                    Expr::expr(Func::lower(Expr::col((link::Entity, link::Column::Url))))
                        .like(format!("%{}%", host)),
                )
                .all(&self.db)
                .await?
                .into_iter()
                .filter(|m| normalize_url(&m.url) == wanted)
                .collect()
            }
        };

        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 取出待检查的链接：最久未检查的排在前面
    pub async fn links_due_for_check(&self, limit: u64) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(link::Column::CheckDisabled.eq(false))
            .filter(link::Column::DeletedAt.is_null())
            .order_by_with_nulls(link::Column::LastCheckedAt, Order::Asc, NullOrdering::First)
            .order_by_asc(link::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// 记录一次检查结果（不修改 updated_at）
    pub async fn record_link_check(
        &self,
        id: i32,
        status: LinkStatus,
        checked_at: DateTime<Utc>,
    ) -> Result<()> {
        link::Entity::update_many()
            .col_expr(link::Column::Status, Expr::value(status.as_i16()))
            .col_expr(link::Column::LastCheckedAt, Expr::value(Some(checked_at)))
            .filter(link::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
