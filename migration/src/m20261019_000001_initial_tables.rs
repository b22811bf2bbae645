use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 users 表
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Name).string().not_null())
                    .col(ColumnDef::new(User::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(User::Password).string().not_null())
                    .col(
                        ColumnDef::new(User::ApiToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 settings 表（user_id 为空表示系统级配置）
        manager
            .create_table(
                Table::create()
                    .table(Setting::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Setting::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Setting::UserId).integer().null())
                    .col(ColumnDef::new(Setting::Key).string().not_null())
                    .col(ColumnDef::new(Setting::Value).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settings_user")
                            .from(Setting::Table, Setting::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 用户级设置 (user_id, key) 唯一；系统级行 user_id 为 NULL，由写入事务保证唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_settings_user_key")
                    .unique()
                    .table(Setting::Table)
                    .col(Setting::UserId)
                    .col(Setting::Key)
                    .to_owned(),
            )
            .await?;

        // 创建 links 表
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::UserId).integer().not_null())
                    .col(ColumnDef::new(Link::Url).text().not_null())
                    .col(ColumnDef::new(Link::Title).string().not_null())
                    .col(ColumnDef::new(Link::Description).text().null())
                    .col(ColumnDef::new(Link::Icon).string().null())
                    .col(
                        ColumnDef::new(Link::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Link::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Link::CheckDisabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_user")
                            .from(Link::Table, Link::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_user_created")
                    .table(Link::Table)
                    .col(Link::UserId)
                    .col(Link::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_deleted_at")
                    .table(Link::Table)
                    .col(Link::DeletedAt)
                    .to_owned(),
            )
            .await?;

        // 创建 tags 表
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tag::UserId).integer().not_null())
                    .col(ColumnDef::new(Tag::Name).string().not_null())
                    .col(
                        ColumnDef::new(Tag::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tag::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tag::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tags_user")
                            .from(Tag::Table, Tag::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tags_user_name")
                    .table(Tag::Table)
                    .col(Tag::UserId)
                    .col(Tag::Name)
                    .to_owned(),
            )
            .await?;

        // 创建 lists 表
        manager
            .create_table(
                Table::create()
                    .table(LinkList::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkList::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkList::UserId).integer().not_null())
                    .col(ColumnDef::new(LinkList::Name).string().not_null())
                    .col(ColumnDef::new(LinkList::Description).text().null())
                    .col(
                        ColumnDef::new(LinkList::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LinkList::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkList::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkList::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lists_user")
                            .from(LinkList::Table, LinkList::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lists_user_name")
                    .table(LinkList::Table)
                    .col(LinkList::UserId)
                    .col(LinkList::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LinkList::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Setting::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    Password,
    ApiToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Setting {
    #[sea_orm(iden = "settings")]
    Table,
    Id,
    UserId,
    Key,
    Value,
}

#[derive(DeriveIden)]
pub(crate) enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    UserId,
    Url,
    Title,
    Description,
    Icon,
    IsPrivate,
    Status,
    CheckDisabled,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Tag {
    #[sea_orm(iden = "tags")]
    Table,
    Id,
    UserId,
    Name,
    IsPrivate,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub(crate) enum LinkList {
    #[sea_orm(iden = "lists")]
    Table,
    Id,
    UserId,
    Name,
    Description,
    IsPrivate,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
