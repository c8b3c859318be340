//! Comment repository.

use std::sync::Arc;

use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::db_error;
use crate::entities::{Comment, comment};

/// Repository for comment operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get comment by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Comments of an article, newest first.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ArticleId.eq(article_id))
            .order_by_desc(comment::Column::TimeCreate)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count comments of an article.
    pub async fn count_by_article(&self, article_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::ArticleId.eq(article_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Delete a comment together with every reply below it.
    pub async fn delete_subtree(&self, path: &str) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(comment::Column::Path.starts_with(path))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected)
    }
}
