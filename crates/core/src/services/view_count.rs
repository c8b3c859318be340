//! Article view counter service.

use chrono::Utc;
use quill_common::{AppResult, IdGenerator};
use quill_db::entities::view_count;
use quill_db::repositories::ViewCountRepository;
use sea_orm::Set;

use super::client_ip::normalize_ip;

/// Service recording article views.
///
/// Every call to [`ViewCountService::record`] stores a row; repeat visits are
/// told apart only when counting unique visitors.
#[derive(Clone)]
pub struct ViewCountService {
    view_repo: ViewCountRepository,
    id_gen: IdGenerator,
}

impl ViewCountService {
    /// Create a new view counter service.
    #[must_use]
    pub const fn new(view_repo: ViewCountRepository) -> Self {
        Self {
            view_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record one view of an article.
    pub async fn record(&self, article_id: &str, ip_address: &str) -> AppResult<view_count::Model> {
        let ip_address = normalize_ip(ip_address)?;

        self.view_repo
            .create(view_count::ActiveModel {
                id: Set(self.id_gen.generate()),
                article_id: Set(article_id.to_string()),
                ip_address: Set(ip_address),
                viewed_on: Set(Utc::now().into()),
            })
            .await
    }

    /// Number of recorded views.
    pub async fn total(&self, article_id: &str) -> AppResult<u64> {
        self.view_repo.count_for_article(article_id).await
    }

    /// Number of distinct addresses the article was viewed from.
    pub async fn unique_visitors(&self, article_id: &str) -> AppResult<u64> {
        self.view_repo.count_distinct_ips(article_id).await
    }
}
