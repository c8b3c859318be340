//! Article repository and the listing / detail query policies.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, TransactionTrait, sea_query::JoinType,
};
use serde::Serialize;

use crate::entities::{
    Article, Category, Comment, PublicationStatus, Rating, Tag, User, UserProfile, article,
    article_tag, category, comment, rating, tag, user, user_profile,
};
use crate::tree::{TreeNode, build_forest};
use crate::{db_error, delete_error};

use super::tag::{TagAssignment, link_tags, unlink_tags};

/// Restricts which published articles a listing returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ArticleFilter {
    /// Every published article.
    #[default]
    All,
    /// Articles filed under any of the given category IDs.
    Categories(Vec<String>),
    /// Articles carrying the given tag ID.
    Tag(String),
}

/// A row of the article listing with its related rows resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleListItem {
    pub article: article::Model,
    pub author: Option<user::Model>,
    pub category: Option<category::Model>,
    pub ratings: Vec<rating::Model>,
}

impl ArticleListItem {
    /// Aggregate rating computed from the prefetched votes.
    #[must_use]
    pub fn rating_sum(&self) -> i64 {
        rating::sum_values(&self.ratings)
    }
}

/// A comment together with its author and the author's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: Option<user::Model>,
    pub profile: Option<user_profile::Model>,
}

/// A published article with everything its page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleDetail {
    pub article: article::Model,
    pub author: Option<user::Model>,
    pub category: Option<category::Model>,
    /// Comment threads, newest first at every level.
    pub comments: Vec<TreeNode<CommentView>>,
    pub tags: Vec<tag::Model>,
    pub ratings: Vec<rating::Model>,
}

impl ArticleDetail {
    /// Aggregate rating computed from the prefetched votes.
    #[must_use]
    pub fn rating_sum(&self) -> i64 {
        rating::sum_values(&self.ratings)
    }

    /// Number of comments across all threads.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(TreeNode::size).sum()
    }
}

/// Repository for article operations.
#[derive(Clone)]
pub struct ArticleRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepository {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find article by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<article::Model>> {
        Article::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get article by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<article::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(id.to_string()))
    }

    /// Find article by slug, whatever its status.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Check whether a slug is taken by an article other than `except_id`.
    pub async fn slug_exists(&self, slug: &str, except_id: Option<&str>) -> AppResult<bool> {
        let mut query = Article::find().filter(article::Column::Slug.eq(slug));
        if let Some(id) = except_id {
            query = query.filter(article::Column::Id.ne(id));
        }

        let count = query.count(self.db.as_ref()).await.map_err(db_error)?;
        Ok(count > 0)
    }

    /// Insert an article together with its tags in one transaction.
    pub async fn create_with_tags(
        &self,
        model: article::ActiveModel,
        tags: TagAssignment,
    ) -> AppResult<article::Model> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let created = model.insert(&txn).await.map_err(db_error)?;
        link_tags(&txn, &created.id, tags).await?;

        txn.commit().await.map_err(db_error)?;
        Ok(created)
    }

    /// Update an article and, when `tags` is given, replace its tag set, in
    /// one transaction.
    pub async fn update_with_tags(
        &self,
        model: article::ActiveModel,
        tags: Option<TagAssignment>,
    ) -> AppResult<article::Model> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let updated = model.update(&txn).await.map_err(db_error)?;
        if let Some(tags) = tags {
            unlink_tags(&txn, &updated.id).await?;
            link_tags(&txn, &updated.id, tags).await?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok(updated)
    }

    /// Update an article.
    pub async fn update(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Delete an article. Comments, ratings, views and tag links go with it.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Article::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(delete_error)?;
        Ok(result.rows_affected)
    }

    /// Count articles (any status) filed under the given categories.
    pub async fn count_by_category_ids(&self, category_ids: &[String]) -> AppResult<u64> {
        if category_ids.is_empty() {
            return Ok(0);
        }

        Article::find()
            .filter(article::Column::CategoryId.is_in(category_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    fn published(filter: &ArticleFilter) -> Select<Article> {
        let query = Article::find().filter(article::Column::Status.eq(PublicationStatus::Published));

        match filter {
            ArticleFilter::All => query,
            ArticleFilter::Categories(ids) => {
                query.filter(article::Column::CategoryId.is_in(ids.clone()))
            }
            ArticleFilter::Tag(tag_id) => query
                .join(JoinType::InnerJoin, article::Relation::ArticleTags.def())
                .filter(article_tag::Column::TagId.eq(tag_id.as_str())),
        }
    }

    /// Count the published articles a listing would page through.
    pub async fn count_published(&self, filter: &ArticleFilter) -> AppResult<u64> {
        if matches!(filter, ArticleFilter::Categories(ids) if ids.is_empty()) {
            return Ok(0);
        }

        Self::published(filter)
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Listing policy: published articles, pinned first, then newest first.
    ///
    /// Authors, categories and ratings are fetched with one query each for the
    /// whole page.
    pub async fn list_published(
        &self,
        filter: &ArticleFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ArticleListItem>> {
        if matches!(filter, ArticleFilter::Categories(ids) if ids.is_empty()) {
            return Ok(vec![]);
        }

        let articles = Self::published(filter)
            .order_by_desc(article::Column::Fixed)
            .order_by_desc(article::Column::TimeCreate)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if articles.is_empty() {
            return Ok(vec![]);
        }

        let author_ids = distinct(articles.iter().map(|a| a.author_id.as_str()));
        let category_ids = distinct(articles.iter().map(|a| a.category_id.as_str()));
        let article_ids: Vec<String> = articles.iter().map(|a| a.id.clone()).collect();

        let authors = by_key(
            User::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(self.db.as_ref())
                .await
                .map_err(db_error)?,
            |u| u.id.clone(),
        );
        let categories = by_key(
            Category::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(self.db.as_ref())
                .await
                .map_err(db_error)?,
            |c| c.id.clone(),
        );
        let mut ratings = group_by_key(
            Rating::find()
                .filter(rating::Column::ArticleId.is_in(article_ids))
                .order_by_desc(rating::Column::TimeCreate)
                .all(self.db.as_ref())
                .await
                .map_err(db_error)?,
            |r| r.article_id.clone(),
        );

        Ok(articles
            .into_iter()
            .map(|article| ArticleListItem {
                author: authors.get(&article.author_id).cloned(),
                category: categories.get(&article.category_id).cloned(),
                ratings: ratings.remove(&article.id).unwrap_or_default(),
                article,
            })
            .collect())
    }

    /// Detail policy: one published article with author, category, comment
    /// threads (authors and profiles resolved), tags and ratings.
    pub async fn find_published_detail(&self, slug: &str) -> AppResult<Option<ArticleDetail>> {
        let Some(article) = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::Status.eq(PublicationStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        let db = self.db.as_ref();

        let author = User::find_by_id(article.author_id.as_str())
            .one(db)
            .await
            .map_err(db_error)?;
        let category = Category::find_by_id(article.category_id.as_str())
            .one(db)
            .await
            .map_err(db_error)?;

        let comments = Comment::find()
            .filter(comment::Column::ArticleId.eq(article.id.as_str()))
            .order_by_desc(comment::Column::TimeCreate)
            .all(db)
            .await
            .map_err(db_error)?;

        let commenter_ids = distinct(comments.iter().map(|c| c.author_id.as_str()));
        let (commenters, profiles) = if commenter_ids.is_empty() {
            (HashMap::new(), HashMap::new())
        } else {
            let users = User::find()
                .filter(user::Column::Id.is_in(commenter_ids.clone()))
                .all(db)
                .await
                .map_err(db_error)?;
            let profiles = UserProfile::find()
                .filter(user_profile::Column::UserId.is_in(commenter_ids))
                .all(db)
                .await
                .map_err(db_error)?;
            (
                by_key(users, |u| u.id.clone()),
                by_key(profiles, |p| p.user_id.clone()),
            )
        };

        let views: Vec<CommentView> = comments
            .into_iter()
            .map(|comment| CommentView {
                author: commenters.get(&comment.author_id).cloned(),
                profile: profiles.get(&comment.author_id).cloned(),
                comment,
            })
            .collect();
        let comments = build_forest(
            views,
            |v| v.comment.id.clone(),
            |v| v.comment.parent_id.clone(),
        );

        let tags = Tag::find()
            .join(JoinType::InnerJoin, tag::Relation::ArticleTags.def())
            .filter(article_tag::Column::ArticleId.eq(article.id.as_str()))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await
            .map_err(db_error)?;

        let ratings = Rating::find()
            .filter(rating::Column::ArticleId.eq(article.id.as_str()))
            .order_by_desc(rating::Column::TimeCreate)
            .all(db)
            .await
            .map_err(db_error)?;

        Ok(Some(ArticleDetail {
            article,
            author,
            category,
            comments,
            tags,
            ratings,
        }))
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

fn by_key<T>(rows: Vec<T>, key: impl Fn(&T) -> String) -> HashMap<String, T> {
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

fn group_by_key<T>(rows: Vec<T>, key: impl Fn(&T) -> String) -> HashMap<String, Vec<T>> {
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}
