//! 链接搜索条件构建
//!
//! `LinkSearch` 中每个开启的选项都折叠进同一个 `Condition::all()`，
//! 与所有权、软删除条件一起交给查询。

use std::collections::BTreeSet;

use sea_orm::sea_query::{BinOper, Expr, ExprTrait, Func, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

use migration::entities::{link, link_list_link, link_tag};

use crate::storage::models::LinkStatus;

/// 搜索选项（已通过校验）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSearch {
    pub query: String,
    pub search_title: bool,
    pub search_description: bool,
    pub private_only: bool,
    pub broken_only: bool,
    pub only_list_ids: BTreeSet<i32>,
    pub only_tag_ids: BTreeSet<i32>,
}

/// 转义 LIKE 通配符；大小写不在这里处理
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// LOWER(column) LIKE LOWER(pattern) ESCAPE '\\'
///
/// 两侧都在数据库中折叠大小写，保证规则一致（SQLite 的 LOWER 只处理 ASCII）。
fn contains_ci(column: link::Column, query: &str) -> SimpleExpr {
    let pattern = Expr::Binary(
        Box::new(Expr::expr(Func::lower(Expr::val(like_pattern(query))))),
        BinOper::Escape,
        Box::new(Expr::Constant('\\'.into())),
    );
    Expr::expr(Func::lower(Expr::col((link::Entity, column)))).binary(BinOper::Like, pattern)
}

/// links.id IN (SELECT link_id FROM link_lists WHERE list_id IN ...)
pub fn in_lists(list_ids: impl IntoIterator<Item = i32>) -> SimpleExpr {
    link::Column::Id.in_subquery(
        Query::select()
            .column(link_list_link::Column::LinkId)
            .from(link_list_link::Entity)
            .and_where(link_list_link::Column::ListId.is_in(list_ids))
            .to_owned(),
    )
}

/// links.id IN (SELECT link_id FROM link_tags WHERE tag_id IN ...)
pub fn tagged_with(tag_ids: impl IntoIterator<Item = i32>) -> SimpleExpr {
    link::Column::Id.in_subquery(
        Query::select()
            .column(link_tag::Column::LinkId)
            .from(link_tag::Entity)
            .and_where(link_tag::Column::TagId.is_in(tag_ids))
            .to_owned(),
    )
}

impl LinkSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// 文本匹配：URL 总是参与，标题和描述按开关参与，字段之间为 OR
    fn text_condition(&self) -> Condition {
        let mut any = Condition::any().add(contains_ci(link::Column::Url, &self.query));
        if self.search_title {
            any = any.add(contains_ci(link::Column::Title, &self.query));
        }
        if self.search_description {
            any = any.add(contains_ci(link::Column::Description, &self.query));
        }
        any
    }

    /// 构建完整过滤条件（不含所有权范围）
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all().add(self.text_condition());

        if self.private_only {
            cond = cond.add(link::Column::IsPrivate.eq(true));
        }

        if self.broken_only {
            cond = cond.add(link::Column::Status.eq(LinkStatus::Broken.as_i16()));
        }

        if !self.only_list_ids.is_empty() {
            cond = cond.add(in_lists(self.only_list_ids.iter().copied()));
        }

        if !self.only_tag_ids.is_empty() {
            cond = cond.add(tagged_with(self.only_tag_ids.iter().copied()));
        }

        cond
    }
}
