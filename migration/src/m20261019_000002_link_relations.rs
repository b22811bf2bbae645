use sea_orm_migration::prelude::*;

use crate::m20261019_000001_initial_tables::{Link, LinkList, Tag};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // link_tags: (link_id, tag_id) 复合主键保证边唯一
        manager
            .create_table(
                Table::create()
                    .table(LinkTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LinkTag::LinkId).integer().not_null())
                    .col(ColumnDef::new(LinkTag::TagId).integer().not_null())
                    .primary_key(Index::create().col(LinkTag::LinkId).col(LinkTag::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_tags_link")
                            .from(LinkTag::Table, LinkTag::LinkId)
                            .to(Link::Table, Link::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_tags_tag")
                            .from(LinkTag::Table, LinkTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_tags_tag")
                    .table(LinkTag::Table)
                    .col(LinkTag::TagId)
                    .to_owned(),
            )
            .await?;

        // link_lists: (link_id, list_id)
        manager
            .create_table(
                Table::create()
                    .table(LinkListLink::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LinkListLink::LinkId).integer().not_null())
                    .col(ColumnDef::new(LinkListLink::ListId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(LinkListLink::LinkId)
                            .col(LinkListLink::ListId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_lists_link")
                            .from(LinkListLink::Table, LinkListLink::LinkId)
                            .to(Link::Table, Link::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_lists_list")
                            .from(LinkListLink::Table, LinkListLink::ListId)
                            .to(LinkList::Table, LinkList::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_lists_list")
                    .table(LinkListLink::Table)
                    .col(LinkListLink::ListId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LinkListLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkTag::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkTag {
    #[sea_orm(iden = "link_tags")]
    Table,
    LinkId,
    TagId,
}

#[derive(DeriveIden)]
enum LinkListLink {
    #[sea_orm(iden = "link_lists")]
    Table,
    LinkId,
    ListId,
}
