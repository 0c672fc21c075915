//! Create posts, tags and post_tags tables migration.

use sea_orm_migration::prelude::*;

use super::create_schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_schema(manager, "posts").await?;

        manager
            .create_table(
                Table::create()
                    .table((Posts::Schema, Posts::Table))
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Posts::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Summary).text().null())
                    .col(
                        ColumnDef::new(Posts::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Posts::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_author_id")
                    .table((Posts::Schema, Posts::Table))
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) for the default listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_status_created_at")
                    .table((Posts::Schema, Posts::Table))
                    .col(Posts::Status)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((Posts::Schema, Tags::Table))
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Tags::Name)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Tags::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table((Posts::Schema, PostTags::Table))
                    .if_not_exists()
                    .col(ColumnDef::new(PostTags::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTags::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostTags::PostId)
                            .col(PostTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tags_post")
                            .from((Posts::Schema, PostTags::Table), PostTags::PostId)
                            .to((Posts::Schema, Posts::Table), Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tags_tag")
                            .from((Posts::Schema, PostTags::Table), PostTags::TagId)
                            .to((Posts::Schema, Tags::Table), Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (tag filter subquery)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_tags_tag_id")
                    .table((Posts::Schema, PostTags::Table))
                    .col(PostTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table((Posts::Schema, PostTags::Table))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table((Posts::Schema, Tags::Table)).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table((Posts::Schema, Posts::Table)).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Posts {
    #[iden = "posts"]
    Schema,
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    Content,
    Summary,
    Status,
    ViewCount,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(Iden)]
enum PostTags {
    Table,
    PostId,
    TagId,
}
