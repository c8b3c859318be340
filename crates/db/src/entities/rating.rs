//! Rating entity (like / dislike votes on articles).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vote value. Stored as `+1` / `-1` so the aggregate is a plain `SUM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum RatingValue {
    #[sea_orm(num_value = 1)]
    Like,
    #[sea_orm(num_value = -1)]
    Dislike,
}

impl RatingValue {
    /// Signed contribution of this vote to the aggregate.
    #[must_use]
    pub const fn score(self) -> i64 {
        match self {
            Self::Like => 1,
            Self::Dislike => -1,
        }
    }
}

impl TryFrom<i32> for RatingValue {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Like),
            -1 => Ok(Self::Dislike),
            other => Err(format!("Rating value must be 1 or -1, got {other}")),
        }
    }
}

/// One vote per (article, IP address); enforced by a unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub article_id: String,

    /// Voting user, if signed in
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    pub value: RatingValue,

    /// Normalized textual IP address of the voter
    pub ip_address: String,

    pub time_create: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_delete = "Cascade"
    )]
    Article,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Sum of vote values.
#[must_use]
pub fn sum_values(ratings: &[Model]) -> i64 {
    ratings.iter().map(|r| r.value.score()).sum()
}
