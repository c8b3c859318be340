//! Rating (like / dislike) service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::entities::rating::{self, RatingValue};
use quill_db::repositories::{ArticleRepository, RatingRepository};
use sea_orm::Set;
use serde::Serialize;

use super::client_ip::normalize_ip;

/// What a submitted vote did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "rating", rename_all = "lowercase")]
pub enum VoteOutcome {
    /// First vote from this address.
    Created(rating::Model),
    /// The address switched between like and dislike.
    Changed(rating::Model),
}

impl VoteOutcome {
    /// The stored vote.
    #[must_use]
    pub const fn rating(&self) -> &rating::Model {
        match self {
            Self::Created(r) | Self::Changed(r) => r,
        }
    }
}

/// Parse a raw `+1` / `-1` vote value.
pub fn parse_vote(value: i32) -> AppResult<RatingValue> {
    RatingValue::try_from(value).map_err(AppError::Validation)
}

/// Service for article ratings.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    article_repo: ArticleRepository,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(rating_repo: RatingRepository, article_repo: ArticleRepository) -> Self {
        Self {
            rating_repo,
            article_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote on an article.
    ///
    /// Each IP address holds at most one vote per article. Repeating the same
    /// vote is a conflict; voting the other way flips the stored vote.
    pub async fn submit(
        &self,
        article_id: &str,
        user_id: Option<&str>,
        ip_address: &str,
        value: RatingValue,
    ) -> AppResult<VoteOutcome> {
        let ip_address = normalize_ip(ip_address)?;
        let article = self.article_repo.get_by_id(article_id).await?;

        let existing = self
            .rating_repo
            .find_by_article_and_ip(&article.id, &ip_address)
            .await?;

        match existing {
            Some(vote) if vote.value == value => Err(already_voted()),
            Some(vote) => {
                let mut active: rating::ActiveModel = vote.into();
                active.value = Set(value);
                if let Some(user_id) = user_id {
                    active.user_id = Set(Some(user_id.to_string()));
                }
                let changed = self.rating_repo.update(active).await?;
                tracing::debug!(article_id = %article.id, ip = %ip_address, ?value, "Changed vote");
                Ok(VoteOutcome::Changed(changed))
            }
            None => {
                let model = rating::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    article_id: Set(article.id.clone()),
                    user_id: Set(user_id.map(ToString::to_string)),
                    value: Set(value),
                    ip_address: Set(ip_address.clone()),
                    time_create: Set(Utc::now().into()),
                };
                // A concurrent vote from the same address loses on the unique index.
                let created = self.rating_repo.create(model).await.map_err(|e| match e {
                    AppError::Conflict(_) => already_voted(),
                    other => other,
                })?;
                tracing::debug!(article_id = %article.id, ip = %ip_address, ?value, "Recorded vote");
                Ok(VoteOutcome::Created(created))
            }
        }
    }

    /// Withdraw the vote an IP address cast on an article.
    pub async fn retract(&self, article_id: &str, ip_address: &str) -> AppResult<()> {
        let ip_address = normalize_ip(ip_address)?;
        let vote = self
            .rating_repo
            .find_by_article_and_ip(article_id, &ip_address)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No vote from {ip_address}")))?;

        self.rating_repo.delete(&vote.id).await?;
        Ok(())
    }

    /// Aggregate rating of an article.
    pub async fn sum(&self, article_id: &str) -> AppResult<i64> {
        self.rating_repo.sum_for_article(article_id).await
    }
}

fn already_voted() -> AppError {
    AppError::Conflict("You have already voted for this article".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_db::entities::{PublicationStatus, article};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_article() -> article::Model {
        article::Model {
            id: "a1".to_string(),
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            short_description: String::new(),
            full_description: String::new(),
            thumbnail: None,
            status: PublicationStatus::Published,
            time_create: Utc::now().into(),
            time_update: Utc::now().into(),
            author_id: "u1".to_string(),
            updater_id: None,
            fixed: false,
            category_id: "c1".to_string(),
        }
    }

    fn create_test_rating(value: RatingValue) -> rating::Model {
        rating::Model {
            id: "r1".to_string(),
            article_id: "a1".to_string(),
            user_id: None,
            value,
            ip_address: "1.2.3.4".to_string(),
            time_create: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> RatingService {
        let db = Arc::new(db.into_connection());
        RatingService::new(RatingRepository::new(db.clone()), ArticleRepository::new(db))
    }

    #[tokio::test]
    async fn test_first_vote_is_created() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article()]])
                .append_query_results([Vec::<rating::Model>::new()])
                .append_query_results([[create_test_rating(RatingValue::Like)]]),
        );

        let outcome = service
            .submit("a1", None, "1.2.3.4", RatingValue::Like)
            .await
            .unwrap();

        assert!(matches!(outcome, VoteOutcome::Created(_)));
        assert_eq!(outcome.rating().value, RatingValue::Like);
    }

    #[tokio::test]
    async fn test_same_vote_twice_is_conflict() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article()]])
                .append_query_results([[create_test_rating(RatingValue::Like)]]),
        );

        let result = service
            .submit("a1", None, "1.2.3.4", RatingValue::Like)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_opposite_vote_changes_value() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article()]])
                .append_query_results([[create_test_rating(RatingValue::Like)]])
                .append_query_results([[create_test_rating(RatingValue::Dislike)]]),
        );

        let outcome = service
            .submit("a1", Some("u9"), "1.2.3.4", RatingValue::Dislike)
            .await
            .unwrap();

        assert!(matches!(outcome, VoteOutcome::Changed(_)));
        assert_eq!(outcome.rating().value.score(), -1);
    }

    #[tokio::test]
    async fn test_invalid_ip_is_rejected() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .submit("a1", None, "localhost", RatingValue::Like)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_retract() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_rating(RatingValue::Like)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        assert!(service.retract("a1", "1.2.3.4").await.is_ok());
    }

    #[tokio::test]
    async fn test_retract_without_vote() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<rating::Model>::new()]),
        );

        assert!(matches!(
            service.retract("a1", "1.2.3.4").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sum() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                maplit::btreemap! { "total" => Value::BigInt(Some(1)) },
            ]]),
        );

        assert_eq!(service.sum("a1").await.unwrap(), 1);
    }

    #[test]
    fn test_parse_vote() {
        assert_eq!(parse_vote(1).unwrap(), RatingValue::Like);
        assert_eq!(parse_vote(-1).unwrap(), RatingValue::Dislike);
        assert!(matches!(parse_vote(0), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_sum_of_prefetched_votes() {
        let votes = [
            create_test_rating(RatingValue::Like),
            create_test_rating(RatingValue::Like),
            create_test_rating(RatingValue::Dislike),
        ];
        assert_eq!(rating::sum_values(&votes), 1);
    }
}
