//! Article entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::status::PublicationStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// URL identifier, unique across all articles
    #[sea_orm(unique)]
    pub slug: String,

    /// Rich-text teaser (at most 500 characters)
    #[sea_orm(column_type = "Text")]
    pub short_description: String,

    /// Rich-text body
    #[sea_orm(column_type = "Text")]
    pub full_description: String,

    /// Storage key of the preview image
    #[sea_orm(nullable)]
    pub thumbnail: Option<String>,

    pub status: PublicationStatus,

    /// Set once, on insert
    pub time_create: DateTimeWithTimeZone,

    /// Refreshed on every save
    pub time_update: DateTimeWithTimeZone,

    #[sea_orm(indexed)]
    pub author_id: String,

    /// Last editor; cleared when that user is deleted
    #[sea_orm(nullable)]
    pub updater_id: Option<String>,

    /// Pinned articles are listed before all others
    #[sea_orm(default_value = false)]
    pub fixed: bool,

    #[sea_orm(indexed)]
    pub category_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UpdaterId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Updater,

    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::rating::Entity")]
    Ratings,

    #[sea_orm(has_many = "super::view_count::Entity")]
    Views,

    #[sea_orm(has_many = "super::article_tag::Entity")]
    ArticleTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::view_count::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl Related<super::article_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleTags.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        if insert && self.time_create.is_not_set() {
            self.time_create = Set(now);
        }
        self.time_update = Set(now);
        Ok(self)
    }
}

impl Model {
    /// Canonical resource path.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/article/{}", self.slug)
    }

    /// Path of the editing form.
    #[must_use]
    pub fn editor_url(&self) -> String {
        format!("/article/{}/update", self.slug)
    }

    /// Path of the delete confirmation.
    #[must_use]
    pub fn delete_url(&self) -> String {
        format!("/article/{}/delete", self.slug)
    }

    /// Whether the public query policies return this article.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.status.is_published()
    }
}
