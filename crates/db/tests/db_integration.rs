//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p quill-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `quill_test`)
//!   `TEST_DB_PASSWORD` (default: `quill_test`)
//!   `TEST_DB_NAME` (default: `quill_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use quill_common::{AppError, IdGenerator};
use quill_db::entities::rating::RatingValue;
use quill_db::entities::{
    PublicationStatus, article, category, comment, rating, tag, user, view_count,
};
use quill_db::repositories::{
    ArticleFilter, ArticleRepository, CategoryRepository, CommentRepository, RatingRepository,
    TagAssignment, TagRepository, UserRepository, ViewCountRepository,
};
use quill_db::test_utils::{TestDatabase, TestDbConfig};
use quill_db::tree;
use sea_orm::{DatabaseConnection, Set};

struct Fixture {
    db: TestDatabase,
    conn: Arc<DatabaseConnection>,
    ids: IdGenerator,
}

impl Fixture {
    async fn new() -> Self {
        let db = TestDatabase::create_unique().await.unwrap();
        let conn = Arc::new(
            sea_orm::Database::connect(&db.config.database_url())
                .await
                .unwrap(),
        );
        Self {
            db,
            conn,
            ids: IdGenerator::new(),
        }
    }

    async fn user(&self, username: &str) -> user::Model {
        UserRepository::new(self.conn.clone())
            .create(user::ActiveModel {
                id: Set(self.ids.generate()),
                username: Set(username.to_string()),
                name: Set(None),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    async fn category(&self, slug: &str, parent: Option<&category::Model>) -> category::Model {
        let id = self.ids.generate();
        let path = parent.map_or_else(|| tree::root_path(&id), |p| tree::child_path(&p.path, &id));
        CategoryRepository::new(self.conn.clone())
            .create(category::ActiveModel {
                id: Set(id),
                title: Set(slug.to_uppercase()),
                slug: Set(slug.to_string()),
                description: Set(String::new()),
                parent_id: Set(parent.map(|p| p.id.clone())),
                depth: Set(tree::depth_of(&path)),
                path: Set(path),
            })
            .await
            .unwrap()
    }

    async fn article(
        &self,
        slug: &str,
        author: &user::Model,
        category: &category::Model,
    ) -> Result<article::Model, AppError> {
        self.article_with(
            slug,
            author,
            category,
            PublicationStatus::Published,
            TagAssignment::default(),
        )
        .await
    }

    async fn article_with(
        &self,
        slug: &str,
        author: &user::Model,
        category: &category::Model,
        status: PublicationStatus,
        tags: TagAssignment,
    ) -> Result<article::Model, AppError> {
        ArticleRepository::new(self.conn.clone())
            .create_with_tags(
                article::ActiveModel {
                    id: Set(self.ids.generate()),
                    title: Set(slug.to_string()),
                    slug: Set(slug.to_string()),
                    short_description: Set(String::new()),
                    full_description: Set(String::new()),
                    thumbnail: Set(None),
                    status: Set(status),
                    author_id: Set(author.id.clone()),
                    updater_id: Set(None),
                    fixed: Set(false),
                    category_id: Set(category.id.clone()),
                    ..Default::default()
                },
                tags,
            )
            .await
    }

    async fn vote(&self, article_id: &str, ip: &str) -> Result<rating::Model, AppError> {
        RatingRepository::new(self.conn.clone())
            .create(rating::ActiveModel {
                id: Set(self.ids.generate()),
                article_id: Set(article_id.to_string()),
                user_id: Set(None),
                value: Set(RatingValue::Like),
                ip_address: Set(ip.to_string()),
                time_create: Set(Utc::now().into()),
            })
            .await
    }

    async fn finish(self) {
        drop(self.conn);
        self.db.drop_database().await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_category_delete_is_protected_then_cascades() {
    let fx = Fixture::new().await;
    let author = fx.user("alice").await;
    let tech = fx.category("tech", None).await;
    let ai = fx.category("ai", Some(&tech)).await;
    let article = fx.article("hello", &author, &tech).await.unwrap();

    let categories = CategoryRepository::new(fx.conn.clone());
    let result = categories.delete_subtree(&tech.path).await;
    assert!(matches!(result, Err(AppError::Protected(_))), "{result:?}");

    ArticleRepository::new(fx.conn.clone())
        .delete(&article.id)
        .await
        .unwrap();
    assert_eq!(categories.delete_subtree(&tech.path).await.unwrap(), 2);
    assert!(categories.find_by_id(&ai.id).await.unwrap().is_none());

    fx.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_article_delete_cascades() {
    let fx = Fixture::new().await;
    let author = fx.user("alice").await;
    let tech = fx.category("tech", None).await;
    let article = fx.article("hello", &author, &tech).await.unwrap();

    let comment_id = fx.ids.generate();
    CommentRepository::new(fx.conn.clone())
        .create(comment::ActiveModel {
            id: Set(comment_id.clone()),
            article_id: Set(article.id.clone()),
            author_id: Set(author.id.clone()),
            content: Set("first".to_string()),
            status: Set(PublicationStatus::Published),
            parent_id: Set(None),
            path: Set(tree::root_path(&comment_id)),
            depth: Set(0),
            ..Default::default()
        })
        .await
        .unwrap();
    fx.vote(&article.id, "1.2.3.4").await.unwrap();
    let views = ViewCountRepository::new(fx.conn.clone());
    views
        .create(view_count::ActiveModel {
            id: Set(fx.ids.generate()),
            article_id: Set(article.id.clone()),
            ip_address: Set("1.2.3.4".to_string()),
            viewed_on: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    ArticleRepository::new(fx.conn.clone())
        .delete(&article.id)
        .await
        .unwrap();

    let comments = CommentRepository::new(fx.conn.clone());
    assert_eq!(comments.count_by_article(&article.id).await.unwrap(), 0);
    let ratings = RatingRepository::new(fx.conn.clone());
    assert!(ratings.find_by_article(&article.id).await.unwrap().is_empty());
    assert_eq!(views.count_for_article(&article.id).await.unwrap(), 0);

    fx.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_one_rating_per_ip() {
    let fx = Fixture::new().await;
    let author = fx.user("alice").await;
    let tech = fx.category("tech", None).await;
    let article = fx.article("hello", &author, &tech).await.unwrap();

    fx.vote(&article.id, "1.2.3.4").await.unwrap();
    let second = fx.vote(&article.id, "1.2.3.4").await;
    assert!(matches!(second, Err(AppError::Conflict(_))), "{second:?}");

    fx.vote(&article.id, "5.6.7.8").await.unwrap();
    let ratings = RatingRepository::new(fx.conn.clone());
    assert_eq!(ratings.sum_for_article(&article.id).await.unwrap(), 2);

    fx.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_article_slug_is_unique() {
    let fx = Fixture::new().await;
    let author = fx.user("alice").await;
    let tech = fx.category("tech", None).await;

    fx.article("hello", &author, &tech).await.unwrap();
    let duplicate = fx.article("hello", &author, &tech).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))), "{duplicate:?}");

    fx.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_move_subtree_rewrites_paths() {
    let fx = Fixture::new().await;
    let tech = fx.category("tech", None).await;
    let ai = fx.category("ai", Some(&tech)).await;
    let ml = fx.category("ml", Some(&ai)).await;

    let categories = CategoryRepository::new(fx.conn.clone());
    let moved = categories
        .move_subtree(&ai, None, &tree::root_path(&ai.id))
        .await
        .unwrap();
    assert_eq!(moved, 2);

    let ai = categories.get_by_id(&ai.id).await.unwrap();
    let ml = categories.get_by_id(&ml.id).await.unwrap();
    assert_eq!(ai.parent_id, None);
    assert_eq!(ai.depth, 0);
    assert_eq!(ml.path, tree::child_path(&ai.path, &ml.id));
    assert_eq!(ml.depth, 1);
    assert!(!ml.is_within(&tech));

    fx.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_user_delete_hands_articles_to_fallback() {
    let fx = Fixture::new().await;
    let admin = fx.user("admin").await;
    let alice = fx.user("alice").await;
    let tech = fx.category("tech", None).await;
    let article = fx.article("hello", &alice, &tech).await.unwrap();

    let users = UserRepository::new(fx.conn.clone());
    assert_eq!(users.delete_with_fallback(&alice.id, &admin.id).await.unwrap(), 1);

    let article = ArticleRepository::new(fx.conn.clone())
        .get_by_id(&article.id)
        .await
        .unwrap();
    assert_eq!(article.author_id, admin.id);
    assert!(users.find_by_id(&alice.id).await.unwrap().is_none());

    fx.finish().await;
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_published_policies_skip_drafts() {
    let fx = Fixture::new().await;
    let author = fx.user("alice").await;
    let tech = fx.category("tech", None).await;

    let rust = tag::ActiveModel {
        id: Set(fx.ids.generate()),
        name: Set("Rust".to_string()),
        slug: Set("rust".to_string()),
    };
    let rust_id = rust.id.clone().unwrap();

    let live = fx
        .article_with(
            "live",
            &author,
            &tech,
            PublicationStatus::Published,
            TagAssignment {
                new_tags: vec![rust],
                tag_ids: vec![rust_id.clone()],
            },
        )
        .await
        .unwrap();
    fx.article_with(
        "draft",
        &author,
        &tech,
        PublicationStatus::Draft,
        TagAssignment {
            new_tags: vec![],
            tag_ids: vec![rust_id.clone()],
        },
    )
    .await
    .unwrap();

    let articles = ArticleRepository::new(fx.conn.clone());
    let filters = [
        ArticleFilter::All,
        ArticleFilter::Categories(vec![tech.id.clone()]),
        ArticleFilter::Tag(rust_id.clone()),
    ];
    for filter in &filters {
        let listed = articles.list_published(filter, 20, 0).await.unwrap();
        let slugs: Vec<_> = listed.iter().map(|i| i.article.slug.as_str()).collect();
        assert_eq!(slugs, vec!["live"], "{filter:?}");
        assert_eq!(articles.count_published(filter).await.unwrap(), 1);
    }

    assert!(articles.find_published_detail("draft").await.unwrap().is_none());
    let detail = articles.find_published_detail("live").await.unwrap().unwrap();
    assert_eq!(detail.article.id, live.id);
    assert_eq!(detail.tags.len(), 1);

    let tags = TagRepository::new(fx.conn.clone());
    assert_eq!(tags.find_by_article(&live.id).await.unwrap()[0].slug, "rust");

    fx.db.cleanup().await.unwrap();
    assert_eq!(articles.count_published(&ArticleFilter::All).await.unwrap(), 0);

    fx.finish().await;
}
