//! User service.
//!
//! Users are only the identity rows the content points at; sign-in lives
//! outside quill.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator, config::BlogConfig};
use quill_db::entities::{user, user_profile};
use quill_db::repositories::UserRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(length(max = 128))]
    pub name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 2048))]
    pub bio: Option<String>,
}

/// Service for users and the default-author fallback.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    default_author_id: String,
    default_author_username: String,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, blog: &BlogConfig) -> Self {
        Self {
            user_repo,
            default_author_id: blog.default_author_id.clone(),
            default_author_username: blog.default_author_username.clone(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Create a user, with a profile row when any profile field is given.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let profile = (input.avatar_url.is_some() || input.bio.is_some()).then(|| {
            user_profile::ActiveModel {
                user_id: Set(String::new()),
                avatar_url: Set(input.avatar_url),
                bio: Set(input.bio),
            }
        });

        let created = self
            .user_repo
            .create_with_profile(
                user::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    username: Set(username),
                    name: Set(input.name),
                    created_at: Set(Utc::now().into()),
                },
                profile,
            )
            .await?;

        tracing::debug!(user_id = %created.id, username = %created.username, "Created user");
        Ok(created)
    }

    /// Make sure the configured default author exists.
    pub async fn ensure_default_author(&self) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_id(&self.default_author_id).await? {
            return Ok(existing);
        }

        let created = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(self.default_author_id.clone()),
                username: Set(self.default_author_username.clone()),
                name: Set(None),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(user_id = %created.id, username = %created.username, "Created default author");
        Ok(created)
    }

    /// Delete a user. Their articles pass to the default author; their
    /// comments and votes are removed.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if id == self.default_author_id {
            return Err(AppError::Protected(
                "The default author cannot be deleted".to_string(),
            ));
        }

        let fallback = self.ensure_default_author().await?;
        let reassigned = self.user_repo.delete_with_fallback(id, &fallback.id).await?;

        tracing::info!(user_id = id, reassigned, "User removed");
        Ok(())
    }
}
