//! Category entity (hierarchical taxonomy).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    /// Short description (at most 300 characters)
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Parent category ID (null for roots)
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    /// Materialized path of ancestor ids, ending with this row's id
    #[sea_orm(indexed)]
    pub path: String,

    /// Distance from the root (0 for roots)
    pub depth: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,

    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Canonical resource path.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/category/{}", self.slug)
    }

    /// Ancestor ids, root first.
    #[must_use]
    pub fn ancestor_ids(&self) -> Vec<String> {
        crate::tree::ancestor_ids(&self.path)
    }

    /// Whether this category is `other` or lies below it.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        crate::tree::is_within(&self.path, &other.path)
    }
}
