//! View counter repository.

use std::sync::Arc;

use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, sea_query::Expr,
};

use crate::db_error;
use crate::entities::{ViewCount, view_count};

/// Repository for article view records.
#[derive(Clone)]
pub struct ViewCountRepository {
    db: Arc<DatabaseConnection>,
}

impl ViewCountRepository {
    /// Create a new view counter repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a view.
    pub async fn create(&self, model: view_count::ActiveModel) -> AppResult<view_count::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Total number of recorded views of an article.
    pub async fn count_for_article(&self, article_id: &str) -> AppResult<u64> {
        ViewCount::find()
            .filter(view_count::Column::ArticleId.eq(article_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Number of distinct IP addresses that viewed an article.
    pub async fn count_distinct_ips(&self, article_id: &str) -> AppResult<u64> {
        let visitors = ViewCount::find()
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT \"ip_address\")"), "visitors")
            .filter(view_count::Column::ArticleId.eq(article_id))
            .into_tuple::<i64>()
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(visitors.and_then(|n| u64::try_from(n).ok()).unwrap_or(0))
    }
}
