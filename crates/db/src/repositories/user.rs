//! User repository.

use std::sync::Arc;

use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::entities::{Article, User, article, user, user_profile};
use crate::{db_error, delete_error};

/// Repository for user operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a user by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Create a user and, when given, their profile in one transaction.
    pub async fn create_with_profile(
        &self,
        model: user::ActiveModel,
        profile: Option<user_profile::ActiveModel>,
    ) -> AppResult<user::Model> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let created = model.insert(&txn).await.map_err(db_error)?;
        if let Some(mut profile) = profile {
            profile.user_id = Set(created.id.clone());
            profile.insert(&txn).await.map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok(created)
    }

    /// Delete a user, handing their articles over to `fallback_author_id`.
    ///
    /// Returns the number of reassigned articles. Comments and ratings of the
    /// user go away with the row; articles they last edited keep no updater.
    pub async fn delete_with_fallback(
        &self,
        user_id: &str,
        fallback_author_id: &str,
    ) -> AppResult<u64> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let reassigned = Article::update_many()
            .col_expr(article::Column::AuthorId, Expr::value(fallback_author_id))
            .filter(article::Column::AuthorId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_error)?
            .rows_affected;

        let deleted = User::delete_by_id(user_id)
            .exec(&txn)
            .await
            .map_err(delete_error)?
            .rows_affected;

        if deleted == 0 {
            txn.rollback().await.map_err(db_error)?;
            return Err(AppError::NotFound(format!("User not found: {user_id}")));
        }

        txn.commit().await.map_err(db_error)?;

        tracing::info!(user_id, fallback_author_id, reassigned, "Deleted user");
        Ok(reassigned)
    }
}
