//! Category repository.

use std::sync::Arc;

use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, Value,
    sea_query::{Expr, SimpleExpr},
};

use crate::entities::{Category, category};
use crate::{db_error, delete_error};

/// Repository for category operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get category by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<category::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))
    }

    /// Find category by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get category by slug, returning error if not found.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(slug.to_string()))
    }

    /// Check whether a slug is taken by a category other than `except_id`.
    pub async fn slug_exists(&self, slug: &str, except_id: Option<&str>) -> AppResult<bool> {
        let mut query = Category::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = except_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        let count = query.count(self.db.as_ref()).await.map_err(db_error)?;
        Ok(count > 0)
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Find categories by IDs, ordered root first.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Category::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(category::Column::Depth)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find top-level categories, ordered by title.
    pub async fn find_roots(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(category::Column::ParentId.is_null())
            .order_by_asc(category::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find direct children of a category, ordered by title.
    pub async fn find_children(&self, parent_id: &str) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(category::Column::ParentId.eq(parent_id))
            .order_by_asc(category::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find every category in the subtree under `path`, the root included.
    pub async fn find_subtree(&self, path: &str) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(category::Column::Path.starts_with(path))
            .order_by_asc(category::Column::Depth)
            .order_by_asc(category::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// IDs of every category in the subtree under `path`, the root included.
    pub async fn find_subtree_ids(&self, path: &str) -> AppResult<Vec<String>> {
        Category::find()
            .select_only()
            .column(category::Column::Id)
            .filter(category::Column::Path.starts_with(path))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find all categories, ordered by title.
    pub async fn find_all(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Re-parent `node`, rewriting the path and depth of its whole subtree.
    ///
    /// `new_path` is the node's path at its new position. Returns the number
    /// of rows whose path changed.
    pub async fn move_subtree(
        &self,
        node: &category::Model,
        new_parent_id: Option<&str>,
        new_path: &str,
    ) -> AppResult<u64> {
        self.update_and_move(None, node, new_parent_id, new_path).await
    }

    /// Apply the field changes in `fields`, if any, and move the subtree of
    /// `node`, in one transaction.
    pub async fn update_and_move(
        &self,
        fields: Option<category::ActiveModel>,
        node: &category::Model,
        new_parent_id: Option<&str>,
        new_path: &str,
    ) -> AppResult<u64> {
        let old_path = node.path.as_str();
        let depth_delta = crate::tree::depth_of(new_path) - node.depth;
        // Postgres SUBSTRING is 1-based.
        let tail_start = i32::try_from(old_path.len() + 1)
            .map_err(|_| AppError::Validation("Category path is too long".to_string()))?;

        let txn = self.db.begin().await.map_err(db_error)?;

        if let Some(fields) = fields {
            fields.update(&txn).await.map_err(db_error)?;
        }

        Category::update_many()
            .col_expr(
                category::Column::ParentId,
                Expr::value(new_parent_id.map(ToString::to_string)),
            )
            .filter(category::Column::Id.eq(node.id.as_str()))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let rewritten_path: SimpleExpr = Expr::cust_with_values(
            "? || SUBSTRING(\"path\" FROM ?)",
            [Value::from(new_path.to_string()), Value::from(tail_start)],
        );
        let moved = Category::update_many()
            .col_expr(category::Column::Path, rewritten_path)
            .col_expr(
                category::Column::Depth,
                Expr::col(category::Column::Depth).add(depth_delta),
            )
            .filter(category::Column::Path.starts_with(old_path))
            .exec(&txn)
            .await
            .map_err(db_error)?
            .rows_affected;

        txn.commit().await.map_err(db_error)?;

        tracing::debug!(category_id = %node.id, old_path, new_path, moved, "Moved category subtree");
        Ok(moved)
    }

    /// Delete every category in the subtree under `path`.
    ///
    /// Fails with [`AppError::Protected`] while an article still points at any
    /// of them.
    pub async fn delete_subtree(&self, path: &str) -> AppResult<u64> {
        let result = Category::delete_many()
            .filter(category::Column::Path.starts_with(path))
            .exec(self.db.as_ref())
            .await
            .map_err(delete_error)?;

        Ok(result.rows_affected)
    }
}
