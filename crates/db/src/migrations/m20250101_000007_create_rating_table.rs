//! Create rating table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rating::ArticleId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::UserId).string_len(32).null())
                    .col(ColumnDef::new(Rating::Value).integer().not_null())
                    .col(ColumnDef::new(Rating::IpAddress).string_len(45).not_null())
                    .col(
                        ColumnDef::new(Rating::TimeCreate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_article")
                            .from(Rating::Table, Rating::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_user")
                            .from(Rating::Table, Rating::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(Rating::Value).is_in([1, -1]))
                    .to_owned(),
            )
            .await?;

        // Unique index: (article_id, ip_address) - one vote per address per article
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_article_ip")
                    .table(Rating::Table)
                    .col(Rating::ArticleId)
                    .col(Rating::IpAddress)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (time_create, value)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_time_create_value")
                    .table(Rating::Table)
                    .col(Rating::TimeCreate)
                    .col(Rating::Value)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    ArticleId,
    UserId,
    Value,
    IpAddress,
    TimeCreate,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
