//! Tag repository.

use std::sync::Arc;

use quill_common::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, sea_query::JoinType,
};

use crate::db_error;
use crate::entities::{ArticleTag, Tag, article_tag, tag};

/// Repository for tag operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find tag by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find tags by slugs.
    pub async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<tag::Model>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Slug.is_in(slugs.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Tags attached to an article, ordered by name.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .join(JoinType::InnerJoin, tag::Relation::ArticleTags.def())
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}

/// The tag set an article should end up with.
///
/// `new_tags` are rows that do not exist yet; `tag_ids` lists every tag of
/// the set, new ones included.
#[derive(Debug, Clone, Default)]
pub struct TagAssignment {
    pub new_tags: Vec<tag::ActiveModel>,
    pub tag_ids: Vec<String>,
}

impl TagAssignment {
    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag_ids.is_empty()
    }
}

/// Insert the missing tags and link every tag of `tags` to the article.
pub(crate) async fn link_tags<C>(conn: &C, article_id: &str, tags: TagAssignment) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if !tags.new_tags.is_empty() {
        Tag::insert_many(tags.new_tags)
            .exec_without_returning(conn)
            .await
            .map_err(db_error)?;
    }

    if !tags.tag_ids.is_empty() {
        let links = tags.tag_ids.into_iter().map(|tag_id| article_tag::ActiveModel {
            article_id: Set(article_id.to_string()),
            tag_id: Set(tag_id),
        });
        ArticleTag::insert_many(links)
            .exec_without_returning(conn)
            .await
            .map_err(db_error)?;
    }

    Ok(())
}

/// Drop every tag link of the article.
pub(crate) async fn unlink_tags<C>(conn: &C, article_id: &str) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = ArticleTag::delete_many()
        .filter(article_tag::Column::ArticleId.eq(article_id))
        .exec(conn)
        .await
        .map_err(db_error)?;
    Ok(result.rows_affected)
}
