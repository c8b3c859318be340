//! Rating repository.

use std::sync::Arc;

use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::db_error;
use crate::entities::{Rating, rating};

/// Repository for rating operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the vote cast on an article from an IP address.
    pub async fn find_by_article_and_ip(
        &self,
        article_id: &str,
        ip_address: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::ArticleId.eq(article_id))
            .filter(rating::Column::IpAddress.eq(ip_address))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Record a vote. A second vote from the same IP is a conflict.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a vote.
    pub async fn update(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete a vote.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Rating::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected)
    }

    /// Votes on an article, newest first.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Vec<rating::Model>> {
        Rating::find()
            .filter(rating::Column::ArticleId.eq(article_id))
            .order_by_desc(rating::Column::TimeCreate)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Sum of vote values on an article (0 without votes).
    pub async fn sum_for_article(&self, article_id: &str) -> AppResult<i64> {
        let total = Rating::find()
            .select_only()
            .column_as(rating::Column::Value.sum(), "total")
            .filter(rating::Column::ArticleId.eq(article_id))
            .into_tuple::<Option<i64>>()
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(total.flatten().unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::rating::RatingValue;
    use chrono::Utc;
    use quill_common::AppError;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr, Set};

    fn create_test_rating(id: &str, value: RatingValue, ip: &str) -> rating::Model {
        rating::Model {
            id: id.to_string(),
            article_id: "a1".to_string(),
            user_id: None,
            value,
            ip_address: ip.to_string(),
            time_create: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_article_and_ip() {
        let vote = create_test_rating("r1", RatingValue::Like, "10.0.0.1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.find_by_article_and_ip("a1", "10.0.0.1").await.unwrap();

        assert_eq!(result, Some(vote));
    }

    #[tokio::test]
    async fn test_sum_for_article() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "total" => sea_orm::Value::BigInt(Some(3)),
                }]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        assert_eq!(repo.sum_for_article("a1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sum_for_article_without_votes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "total" => sea_orm::Value::BigInt(None),
                }]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        assert_eq!(repo.sum_for_article("a1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "connection reset".to_string(),
                ))])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let model = rating::ActiveModel {
            id: Set("r1".to_string()),
            article_id: Set("a1".to_string()),
            user_id: Set(None),
            value: Set(RatingValue::Dislike),
            ip_address: Set("10.0.0.1".to_string()),
            time_create: Set(Utc::now().into()),
        };

        assert!(matches!(
            repo.create(model).await,
            Err(AppError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        assert_eq!(repo.delete("r1").await.unwrap(), 1);
    }
}
