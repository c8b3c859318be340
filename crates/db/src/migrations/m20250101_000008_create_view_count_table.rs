//! Create `view_count` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ViewCount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ViewCount::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ViewCount::ArticleId).string_len(32).not_null())
                    .col(ColumnDef::new(ViewCount::IpAddress).string_len(45).not_null())
                    .col(
                        ColumnDef::new(ViewCount::ViewedOn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_view_count_article")
                            .from(ViewCount::Table, ViewCount::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_view_count_article_id")
                    .table(ViewCount::Table)
                    .col(ViewCount::ArticleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_view_count_viewed_on")
                    .table(ViewCount::Table)
                    .col(ViewCount::ViewedOn)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ViewCount::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ViewCount {
    Table,
    Id,
    ArticleId,
    IpAddress,
    ViewedOn,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
