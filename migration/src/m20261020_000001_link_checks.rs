use sea_orm_migration::prelude::*;

use crate::m20261019_000001_initial_tables::Link;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 链接健康检查：记录最后检查时间
        manager
            .alter_table(
                Table::alter()
                    .table(Link::Table)
                    .add_column(
                        ColumnDef::new(LinkCheck::LastCheckedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_last_checked_at")
                    .table(Link::Table)
                    .col(LinkCheck::LastCheckedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_links_last_checked_at")
                    .table(Link::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Link::Table)
                    .drop_column(LinkCheck::LastCheckedAt)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum LinkCheck {
    LastCheckedAt,
}
