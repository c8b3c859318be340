//! Create article table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Article::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Article::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Article::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Article::ShortDescription).text().not_null())
                    .col(ColumnDef::new(Article::FullDescription).text().not_null())
                    .col(ColumnDef::new(Article::Thumbnail).string_len(512))
                    .col(
                        ColumnDef::new(Article::Status)
                            .string_len(10)
                            .not_null()
                            .default("published"),
                    )
                    .col(
                        ColumnDef::new(Article::TimeCreate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Article::TimeUpdate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Article::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Article::UpdaterId).string_len(32).null())
                    .col(
                        ColumnDef::new(Article::Fixed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Article::CategoryId).string_len(32).not_null())
                    // Author deletion reassigns articles to the default author
                    // before the user row goes away.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_author")
                            .from(Article::Table, Article::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_updater")
                            .from(Article::Table, Article::UpdaterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_category")
                            .from(Article::Table, Article::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_slug")
                    .table(Article::Table)
                    .col(Article::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (fixed, time_create) - listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_article_fixed_time_create")
                    .table(Article::Table)
                    .col(Article::Fixed)
                    .col(Article::TimeCreate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_category_id")
                    .table(Article::Table)
                    .col(Article::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_author_id")
                    .table(Article::Table)
                    .col(Article::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
    Title,
    Slug,
    ShortDescription,
    FullDescription,
    Thumbnail,
    Status,
    TimeCreate,
    TimeUpdate,
    AuthorId,
    UpdaterId,
    Fixed,
    CategoryId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}
