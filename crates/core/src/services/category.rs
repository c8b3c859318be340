//! Category service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::entities::category;
use quill_db::repositories::{ArticleRepository, CategoryRepository};
use quill_db::tree::{self, TreeNode};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::slug::unique_slug;

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 300))]
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<String>,
}

/// Input for updating a category.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 300))]
    pub description: Option<String>,
    /// `Some(None)` moves the category to the top level.
    pub parent_id: Option<Option<String>>,
}

/// Service for managing the category tree.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    article_repo: ArticleRepository,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository, article_repo: ArticleRepository) -> Self {
        Self {
            category_repo,
            article_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a category by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<category::Model> {
        self.category_repo.get_by_id(id).await
    }

    /// Get a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo.get_by_slug(slug).await
    }

    /// Create a new category.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let parent = match input.parent_id.as_deref() {
            Some(parent_id) => Some(self.category_repo.get_by_id(parent_id).await?),
            None => None,
        };

        let repo = &self.category_repo;
        let slug = unique_slug(input.slug.as_deref(), &title, "category", |candidate| async move {
            repo.slug_exists(&candidate, None).await
        })
        .await?;

        let id = self.id_gen.generate();
        let path = parent
            .as_ref()
            .map_or_else(|| tree::root_path(&id), |p| tree::child_path(&p.path, &id));

        let model = category::ActiveModel {
            id: Set(id),
            title: Set(title),
            slug: Set(slug),
            description: Set(input.description),
            parent_id: Set(parent.map(|p| p.id)),
            depth: Set(tree::depth_of(&path)),
            path: Set(path),
        };

        let created = self.category_repo.create(model).await?;
        tracing::debug!(category_id = %created.id, slug = %created.slug, "Created category");
        Ok(created)
    }

    /// Update a category. A changed `parent_id` moves the whole subtree.
    pub async fn update(&self, id: &str, input: UpdateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let current = self.category_repo.get_by_id(id).await?;
        let mut active: category::ActiveModel = current.clone().into();
        let mut changed = false;

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
            active.title = Set(title);
            changed = true;
        }

        if let Some(requested) = input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            let repo = &self.category_repo;
            let slug = unique_slug(Some(requested), "", "category", |candidate| async move {
                repo.slug_exists(&candidate, Some(id)).await
            })
            .await?;
            active.slug = Set(slug);
            changed = true;
        }

        if let Some(description) = input.description {
            active.description = Set(description);
            changed = true;
        }

        let planned = match input.parent_id.filter(|p| *p != current.parent_id) {
            Some(parent_id) => self
                .plan_move(&current, parent_id.as_deref())
                .await?
                .map(|new_path| (parent_id, new_path)),
            None => None,
        };

        match planned {
            Some((parent_id, new_path)) => {
                let moved = self
                    .category_repo
                    .update_and_move(
                        changed.then_some(active),
                        &current,
                        parent_id.as_deref(),
                        &new_path,
                    )
                    .await?;
                tracing::info!(category_id = %current.id, moved, "Moved category");
                self.category_repo.get_by_id(id).await
            }
            None if changed => self.category_repo.update(active).await,
            None => Ok(current),
        }
    }

    /// Re-parent a category, carrying its descendants along.
    ///
    /// Moving a category under itself or one of its descendants is rejected.
    pub async fn move_to(&self, id: &str, new_parent_id: Option<&str>) -> AppResult<category::Model> {
        let node = self.category_repo.get_by_id(id).await?;

        let Some(new_path) = self.plan_move(&node, new_parent_id).await? else {
            return Ok(node);
        };

        let moved = self
            .category_repo
            .move_subtree(&node, new_parent_id, &new_path)
            .await?;
        tracing::info!(category_id = %node.id, moved, "Moved category");

        self.category_repo.get_by_id(id).await
    }

    /// Path of `node` under its new parent, or `None` when it stays put.
    async fn plan_move(
        &self,
        node: &category::Model,
        new_parent_id: Option<&str>,
    ) -> AppResult<Option<String>> {
        let new_path = match new_parent_id {
            Some(parent_id) => {
                let parent = self.category_repo.get_by_id(parent_id).await?;
                if parent.is_within(node) {
                    return Err(AppError::Validation(
                        "Cannot move a category under itself or one of its descendants"
                            .to_string(),
                    ));
                }
                tree::child_path(&parent.path, &node.id)
            }
            None => tree::root_path(&node.id),
        };

        Ok((new_path != node.path).then_some(new_path))
    }

    /// Top-level categories, ordered by title.
    pub async fn roots(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_roots().await
    }

    /// Direct children of a category, ordered by title.
    pub async fn children(&self, id: &str) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_children(id).await
    }

    /// Ancestors of a category, root first.
    pub async fn ancestors(&self, id: &str) -> AppResult<Vec<category::Model>> {
        let node = self.category_repo.get_by_id(id).await?;
        self.category_repo.find_by_ids(&node.ancestor_ids()).await
    }

    /// Every category below this one, by depth then title.
    pub async fn descendants(&self, id: &str) -> AppResult<Vec<category::Model>> {
        let node = self.category_repo.get_by_id(id).await?;
        let mut subtree = self.category_repo.find_subtree(&node.path).await?;
        subtree.retain(|c| c.id != node.id);
        Ok(subtree)
    }

    /// The whole category forest; siblings are ordered by title.
    pub async fn tree(&self) -> AppResult<Vec<TreeNode<category::Model>>> {
        let all = self.category_repo.find_all().await?;
        Ok(tree::build_forest(
            all,
            |c| c.id.clone(),
            |c| c.parent_id.clone(),
        ))
    }

    /// Delete a category and every category below it.
    ///
    /// Refused while any article is filed under one of them.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let node = self.category_repo.get_by_id(id).await?;
        let subtree_ids = self.category_repo.find_subtree_ids(&node.path).await?;

        let articles = self.article_repo.count_by_category_ids(&subtree_ids).await?;
        if articles > 0 {
            return Err(AppError::Protected(format!(
                "Category \"{}\" or one of its subcategories still has {articles} article(s)",
                node.title
            )));
        }

        let deleted = self.category_repo.delete_subtree(&node.path).await?;
        tracing::info!(category_id = %node.id, deleted, "Deleted category subtree");
        Ok(deleted)
    }
}
