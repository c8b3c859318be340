//! Comment service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::entities::{PublicationStatus, comment};
use quill_db::repositories::{ArticleRepository, CommentRepository};
use quill_db::tree::{self, TreeNode};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Maximum comment length, in characters.
pub const MAX_COMMENT_LEN: u64 = 3000;

/// Input for posting a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub article_id: String,
    #[validate(length(min = 1, max = 3000))]
    pub content: String,
    /// Comment being replied to.
    pub parent_id: Option<String>,
}

/// Service for article comments.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    article_repo: ArticleRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, article_repo: ArticleRepository) -> Self {
        Self {
            comment_repo,
            article_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment or a reply.
    ///
    /// A reply has to belong to the same article as the comment it answers.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;
        let content = required_content(&input.content)?;

        let article = self.article_repo.get_by_id(&input.article_id).await?;

        let parent = match input.parent_id.as_deref() {
            Some(parent_id) => {
                let parent = self.comment_repo.get_by_id(parent_id).await?;
                if parent.article_id != article.id {
                    return Err(AppError::Validation(
                        "Reply must belong to the same article as its parent".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let id = self.id_gen.generate();
        let path = parent
            .as_ref()
            .map_or_else(|| tree::root_path(&id), |p| tree::child_path(&p.path, &id));

        let model = comment::ActiveModel {
            id: Set(id),
            article_id: Set(article.id),
            author_id: Set(author_id.to_string()),
            content: Set(content),
            status: Set(PublicationStatus::Published),
            parent_id: Set(parent.map(|p| p.id)),
            depth: Set(tree::depth_of(&path)),
            path: Set(path),
            ..Default::default()
        };

        let created = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %created.id, article_id = %created.article_id, "Created comment");
        Ok(created)
    }

    /// Replace the text of a comment.
    pub async fn update_content(&self, id: &str, content: &str) -> AppResult<comment::Model> {
        let content = required_content(content)?;

        let mut active: comment::ActiveModel = self.comment_repo.get_by_id(id).await?.into();
        active.content = Set(content);
        self.comment_repo.update(active).await
    }

    /// Publish or hide a comment.
    pub async fn set_status(
        &self,
        id: &str,
        status: PublicationStatus,
    ) -> AppResult<comment::Model> {
        let mut active: comment::ActiveModel = self.comment_repo.get_by_id(id).await?.into();
        active.status = Set(status);
        self.comment_repo.update(active).await
    }

    /// Delete a comment and every reply below it.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let comment = self.comment_repo.get_by_id(id).await?;
        let deleted = self.comment_repo.delete_subtree(&comment.path).await?;
        tracing::debug!(comment_id = %comment.id, deleted, "Deleted comment thread");
        Ok(deleted)
    }

    /// All comments of an article as threads, newest first at every level.
    pub async fn thread(&self, article_id: &str) -> AppResult<Vec<TreeNode<comment::Model>>> {
        let comments = self.comment_repo.find_by_article(article_id).await?;
        Ok(tree::build_forest(
            comments,
            |c| c.id.clone(),
            |c| c.parent_id.clone(),
        ))
    }
}

fn required_content(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    if content.chars().count() as u64 > MAX_COMMENT_LEN {
        return Err(AppError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}
