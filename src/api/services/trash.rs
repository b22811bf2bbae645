//! 回收站页面

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::Context;

use crate::api::flash::{self, FlashMessage};
use crate::api::middleware::CurrentUser;
use crate::errors::{LinkaceError, Result};
use crate::services::AppServices;
use crate::storage::{EntityKind, TrashContents};
use crate::views::Views;

#[derive(Debug, Serialize)]
struct TrashItem {
    id: i32,
    label: String,
    deleted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct TrashSection {
    title: &'static str,
    kind: &'static str,
    items: Vec<TrashItem>,
}

fn sections(contents: TrashContents) -> Vec<TrashSection> {
    let item = |id, label, deleted_at: Option<DateTime<Utc>>| {
        deleted_at.map(|deleted_at| TrashItem {
            id,
            label,
            deleted_at,
        })
    };
    vec![
        TrashSection {
            title: "Links",
            kind: "link",
            items: contents
                .links
                .into_iter()
                .filter_map(|l| item(l.id, l.title, l.deleted_at))
                .collect(),
        },
        TrashSection {
            title: "Lists",
            kind: "list",
            items: contents
                .lists
                .into_iter()
                .filter_map(|l| item(l.id, l.name, l.deleted_at))
                .collect(),
        },
        TrashSection {
            title: "Tags",
            kind: "tag",
            items: contents
                .tags
                .into_iter()
                .filter_map(|t| item(t.id, t.name, t.deleted_at))
                .collect(),
        },
    ]
}

pub async fn index(
    req: HttpRequest,
    user: CurrentUser,
    services: web::Data<AppServices>,
    views: web::Data<Views>,
) -> Result<HttpResponse> {
    let contents = services.trash.contents(user.id()).await?;
    let mut ctx = Context::new();
    ctx.insert("sections", &sections(contents));
    views.page(&req, Some(&user.0), "trash.html", ctx)
}

pub async fn restore(
    user: CurrentUser,
    services: web::Data<AppServices>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse> {
    let (kind, id) = path.into_inner();
    let kind = EntityKind::from_str(&kind)
        .map_err(|_| LinkaceError::not_found(format!("Unknown trash type: {}", kind)))?;
    match services.trash.restore(kind, user.id(), id).await {
        Ok(()) => Ok(flash::redirect(
            "/trash",
            vec![FlashMessage::success("Entry restored successfully.")],
        )),
        // 同名记录已存在，留在回收站并提示
        Err(LinkaceError::Validation(errors)) => Ok(flash::redirect(
            "/trash",
            vec![FlashMessage::error(
                errors
                    .first_message()
                    .unwrap_or_else(|| "The entry could not be restored.".to_string()),
            )],
        )),
        Err(e) => Err(e),
    }
}
