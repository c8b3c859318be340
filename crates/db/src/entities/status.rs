//! Publication status shared by articles and comments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a row is publicly visible.
///
/// Transitions are unconstrained: an editor may set either value at any time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "draft")]
    Draft,
}

impl PublicationStatus {
    /// Whether the row is visible through the public query policies.
    #[must_use]
    pub const fn is_published(self) -> bool {
        matches!(self, Self::Published)
    }
}
