//! Article service.

use std::sync::Arc;

use chrono::Utc;
use quill_common::{
    AppError, AppResult, IdGenerator, StorageBackend, slugify, thumbnail_storage_key,
};
use quill_db::entities::{PublicationStatus, article, tag};
use quill_db::repositories::{
    ArticleDetail, ArticleFilter, ArticleListItem, ArticleRepository, CategoryRepository,
    RatingRepository, TagAssignment, TagRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::slug::unique_slug;

/// Default number of articles per listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum length of a tag name, in characters.
const MAX_TAG_LEN: usize = 100;

/// Input for creating an article.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub status: PublicationStatus,
    #[serde(default)]
    pub fixed: bool,
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating an article.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    /// A blank slug is derived again from the title.
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub status: Option<PublicationStatus>,
    pub fixed: Option<bool>,
    pub category_id: Option<String>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
}

/// Service for managing articles.
#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    category_repo: CategoryRepository,
    tag_repo: TagRepository,
    rating_repo: RatingRepository,
    storage: Option<Arc<dyn StorageBackend>>,
    page_size: u64,
    id_gen: IdGenerator,
}

impl ArticleService {
    /// Create a new article service.
    #[must_use]
    pub const fn new(
        article_repo: ArticleRepository,
        category_repo: CategoryRepository,
        tag_repo: TagRepository,
        rating_repo: RatingRepository,
    ) -> Self {
        Self {
            article_repo,
            category_repo,
            tag_repo,
            rating_repo,
            storage: None,
            page_size: DEFAULT_PAGE_SIZE,
            id_gen: IdGenerator::new(),
        }
    }

    /// Attach the backend thumbnails are stored in.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the number of articles per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Get an article by ID, whatever its status.
    pub async fn get_by_id(&self, id: &str) -> AppResult<article::Model> {
        self.article_repo.get_by_id(id).await
    }

    /// Get an article by slug, whatever its status. Editing screens address
    /// articles this way.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<article::Model> {
        self.article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(slug.to_string()))
    }

    /// Create a new article.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateArticleInput,
    ) -> AppResult<article::Model> {
        input.validate()?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let tags = self.resolve_tags(&input.tags).await?;
        let category = self.category_repo.get_by_id(&input.category_id).await?;

        let repo = &self.article_repo;
        let slug = unique_slug(input.slug.as_deref(), &title, "article", |candidate| async move {
            repo.slug_exists(&candidate, None).await
        })
        .await?;

        let model = article::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title),
            slug: Set(slug),
            short_description: Set(input.short_description),
            full_description: Set(input.full_description),
            thumbnail: Set(None),
            status: Set(input.status),
            author_id: Set(author_id.to_string()),
            updater_id: Set(None),
            fixed: Set(input.fixed),
            category_id: Set(category.id),
            ..Default::default()
        };

        let created = self.article_repo.create_with_tags(model, tags).await?;

        tracing::debug!(article_id = %created.id, slug = %created.slug, "Created article");
        Ok(created)
    }

    /// Update an article on behalf of `updater_id`.
    pub async fn update(
        &self,
        id: &str,
        updater_id: &str,
        input: UpdateArticleInput,
    ) -> AppResult<article::Model> {
        input.validate()?;

        let tags = match input.tags.as_deref() {
            Some(names) => Some(self.resolve_tags(names).await?),
            None => None,
        };

        let current = self.article_repo.get_by_id(id).await?;
        let mut title = current.title.clone();
        let mut active: article::ActiveModel = current.into();

        if let Some(new_title) = input.title {
            title = new_title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
            active.title = Set(title.clone());
        }

        if let Some(requested) = input.slug.as_deref() {
            let repo = &self.article_repo;
            let slug = unique_slug(Some(requested), &title, "article", |candidate| async move {
                repo.slug_exists(&candidate, Some(id)).await
            })
            .await?;
            active.slug = Set(slug);
        }

        if let Some(short_description) = input.short_description {
            active.short_description = Set(short_description);
        }
        if let Some(full_description) = input.full_description {
            active.full_description = Set(full_description);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(fixed) = input.fixed {
            active.fixed = Set(fixed);
        }
        if let Some(category_id) = input.category_id {
            let category = self.category_repo.get_by_id(&category_id).await?;
            active.category_id = Set(category.id);
        }
        active.updater_id = Set(Some(updater_id.to_string()));

        let updated = self.article_repo.update_with_tags(active, tags).await?;

        tracing::debug!(article_id = %updated.id, updater_id, "Updated article");
        Ok(updated)
    }

    /// Publish or unpublish an article.
    pub async fn set_status(
        &self,
        id: &str,
        status: PublicationStatus,
    ) -> AppResult<article::Model> {
        let mut active: article::ActiveModel = self.article_repo.get_by_id(id).await?.into();
        active.status = Set(status);
        self.article_repo.update(active).await
    }

    /// Pin or unpin an article.
    pub async fn set_fixed(&self, id: &str, fixed: bool) -> AppResult<article::Model> {
        let mut active: article::ActiveModel = self.article_repo.get_by_id(id).await?.into();
        active.fixed = Set(fixed);
        self.article_repo.update(active).await
    }

    /// Delete an article with its comments, ratings, views and thumbnail.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let article = self.article_repo.get_by_id(id).await?;
        self.article_repo.delete(&article.id).await?;

        if let Some(key) = article.thumbnail.as_deref() {
            self.delete_stored_thumbnail(key).await;
        }

        tracing::info!(article_id = %article.id, "Deleted article");
        Ok(())
    }

    /// Published articles, pinned first then newest first. Pages start at 1.
    pub async fn list_published(&self, page: u64) -> AppResult<Vec<ArticleListItem>> {
        self.list(&ArticleFilter::All, page).await
    }

    /// Published articles filed under a category or any category below it.
    pub async fn list_by_category(
        &self,
        category_slug: &str,
        page: u64,
    ) -> AppResult<Vec<ArticleListItem>> {
        let category = self.category_repo.get_by_slug(category_slug).await?;
        let ids = self.category_repo.find_subtree_ids(&category.path).await?;
        self.list(&ArticleFilter::Categories(ids), page).await
    }

    /// Published articles carrying a tag.
    pub async fn list_by_tag(&self, tag_slug: &str, page: u64) -> AppResult<Vec<ArticleListItem>> {
        let tag = self
            .tag_repo
            .find_by_slug(tag_slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag not found: {tag_slug}")))?;
        self.list(&ArticleFilter::Tag(tag.id), page).await
    }

    /// Number of published articles.
    pub async fn count_published(&self) -> AppResult<u64> {
        self.article_repo
            .count_published(&ArticleFilter::All)
            .await
    }

    async fn list(&self, filter: &ArticleFilter, page: u64) -> AppResult<Vec<ArticleListItem>> {
        let offset = page.saturating_sub(1).saturating_mul(self.page_size);
        self.article_repo
            .list_published(filter, self.page_size, offset)
            .await
    }

    /// A published article with its author, category, comments, tags and
    /// ratings.
    pub async fn get_detail(&self, slug: &str) -> AppResult<ArticleDetail> {
        self.article_repo
            .find_published_detail(slug)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(slug.to_string()))
    }

    /// Aggregate rating of an article.
    pub async fn rating_sum(&self, id: &str) -> AppResult<i64> {
        self.rating_repo.sum_for_article(id).await
    }

    /// Store a new thumbnail for an article and drop the previous one.
    pub async fn attach_thumbnail(
        &self,
        id: &str,
        original_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<article::Model> {
        let key = thumbnail_storage_key(original_name, Utc::now())?;
        let storage = self.storage()?;

        let article = self.article_repo.get_by_id(id).await?;
        let previous = article.thumbnail.clone();

        storage.upload(&key, data, content_type).await?;

        let mut active: article::ActiveModel = article.into();
        active.thumbnail = Set(Some(key));
        let updated = self.article_repo.update(active).await?;

        if let Some(old) = previous.as_deref() {
            self.delete_stored_thumbnail(old).await;
        }

        Ok(updated)
    }

    /// Remove the thumbnail of an article.
    pub async fn remove_thumbnail(&self, id: &str) -> AppResult<article::Model> {
        let article = self.article_repo.get_by_id(id).await?;
        let Some(old) = article.thumbnail.clone() else {
            return Ok(article);
        };

        let mut active: article::ActiveModel = article.into();
        active.thumbnail = Set(None);
        let updated = self.article_repo.update(active).await?;

        self.delete_stored_thumbnail(&old).await;
        Ok(updated)
    }

    fn storage(&self) -> AppResult<&Arc<dyn StorageBackend>> {
        self.storage
            .as_ref()
            .ok_or_else(|| AppError::Internal("No storage backend configured".to_string()))
    }

    async fn delete_stored_thumbnail(&self, key: &str) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to delete old thumbnail");
        }
    }

    /// Tags of an article, ordered by name.
    pub async fn tags(&self, id: &str) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_by_article(id).await
    }

    /// Map tag names to the tag set to store, reusing existing tags.
    ///
    /// Nothing is written here; missing tags come back as rows to insert
    /// along with the article.
    async fn resolve_tags(&self, names: &[String]) -> AppResult<TagAssignment> {
        let wanted = tag_slugs(names)?;
        if wanted.is_empty() {
            return Ok(TagAssignment::default());
        }

        let slugs: Vec<String> = wanted.iter().map(|(s, _)| s.clone()).collect();
        let existing = self.tag_repo.find_by_slugs(&slugs).await?;

        let mut tags = TagAssignment::default();
        for (slug, name) in wanted {
            if let Some(tag) = existing.iter().find(|t| t.slug == slug) {
                tags.tag_ids.push(tag.id.clone());
                continue;
            }
            let id = self.id_gen.generate();
            tags.tag_ids.push(id.clone());
            tags.new_tags.push(tag::ActiveModel {
                id: Set(id),
                name: Set(name),
                slug: Set(slug),
            });
        }

        Ok(tags)
    }
}

/// Validate tag names and pair each distinct slug with the name it came from.
///
/// Names are matched case-insensitively through their slug; blanks and
/// duplicates are dropped.
fn tag_slugs(names: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut wanted: Vec<(String, String)> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if name.chars().count() > MAX_TAG_LEN {
            return Err(AppError::Validation(format!(
                "Tag name must be at most {MAX_TAG_LEN} characters"
            )));
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "Tag name must contain letters or digits: {name}"
            )));
        }
        if !wanted.iter().any(|(s, _)| *s == slug) {
            wanted.push((slug, name.to_string()));
        }
    }
    Ok(wanted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_common::UploadedFile;
    use quill_db::entities::category;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        uploaded: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for MemoryStorage {
        async fn upload(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<UploadedFile> {
            self.uploaded.lock().unwrap().push(key.to_string());
            Ok(UploadedFile {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: String::new(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.uploaded.lock().unwrap().iter().any(|k| k == key))
        }
    }

    fn create_test_category() -> category::Model {
        category::Model {
            id: "c1".to_string(),
            title: "Tech".to_string(),
            slug: "tech".to_string(),
            description: String::new(),
            parent_id: None,
            path: "/c1/".to_string(),
            depth: 0,
        }
    }

    fn create_test_article(slug: &str, thumbnail: Option<&str>) -> article::Model {
        article::Model {
            id: "a1".to_string(),
            title: "Hello World".to_string(),
            slug: slug.to_string(),
            short_description: String::new(),
            full_description: String::new(),
            thumbnail: thumbnail.map(ToString::to_string),
            status: PublicationStatus::Published,
            time_create: Utc::now().into(),
            time_update: Utc::now().into(),
            author_id: "u1".to_string(),
            updater_id: None,
            fixed: false,
            category_id: "c1".to_string(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    fn service(db: Arc<DatabaseConnection>) -> ArticleService {
        ArticleService::new(
            ArticleRepository::new(db.clone()),
            CategoryRepository::new(db.clone()),
            TagRepository::new(db.clone()),
            RatingRepository::new(db),
        )
    }

    fn create_input(title: &str) -> CreateArticleInput {
        CreateArticleInput {
            title: title.to_string(),
            slug: None,
            short_description: "teaser".to_string(),
            full_description: "body".to_string(),
            status: PublicationStatus::default(),
            fixed: false,
            category_id: "c1".to_string(),
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_derives_next_free_slug() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_category()]])
                .append_query_results([[count_row(1)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[create_test_article("hello-world-2", None)]])
                .into_connection(),
        );

        let service = service(db.clone());
        let created = service
            .create("u1", create_input("Hello World"))
            .await
            .unwrap();
        assert_eq!(created.slug, "hello-world-2");
        assert!(created.is_published());

        drop(service);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let insert = format!("{:?}", log.last().unwrap());
        assert!(insert.contains("INSERT INTO"), "{insert}");
        assert!(insert.contains("hello-world-2"), "{insert}");
    }

    #[tokio::test]
    async fn test_create_rejects_long_teaser() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let mut input = create_input("Hello");
        input.short_description = "x".repeat(501);

        assert!(matches!(
            service(db).create("u1", input).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_unknown_category() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        assert!(matches!(
            service(db).create("u1", create_input("Hello")).await,
            Err(AppError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_with_tags() {
        let rust = tag::Model {
            id: "t1".to_string(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rust.clone()]])
                .append_query_results([[create_test_category()]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[create_test_article("hello-world", None)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                ])
                .into_connection(),
        );

        let mut input = create_input("Hello World");
        input.tags = vec![
            "rust".to_string(),
            " Web ".to_string(),
            "RUST".to_string(),
            String::new(),
        ];

        let service = service(db.clone());
        let created = service.create("u1", input).await.unwrap();
        assert_eq!(created.slug, "hello-world");
        drop(service);

        // Article, new tag and links are written in one transaction.
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let writes = format!("{:?}", log.last().unwrap());
        assert!(writes.contains("BEGIN"), "{writes}");
        assert!(writes.contains("\"web\""), "{writes}");
        assert!(writes.contains("COMMIT"), "{writes}");
    }

    #[tokio::test]
    async fn test_create_with_bad_tag_writes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let mut input = create_input("Hello");
        input.tags = vec!["rust".to_string(), "x".repeat(101)];

        let service = service(db.clone());
        assert!(matches!(
            service.create("u1", input).await,
            Err(AppError::Validation(_))
        ));

        let mut input = create_input("Hello");
        input.tags = vec!["!!!".to_string()];
        assert!(matches!(
            service.create("u1", input).await,
            Err(AppError::Validation(_))
        ));
        drop(service);

        assert!(Arc::try_unwrap(db).unwrap().into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_bad_tag_writes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = UpdateArticleInput {
            title: Some("Hello Again".to_string()),
            tags: Some(vec!["x".repeat(101)]),
            ..Default::default()
        };

        let service = service(db.clone());
        assert!(matches!(
            service.update("a1", "u2", input).await,
            Err(AppError::Validation(_))
        ));
        drop(service);

        assert!(Arc::try_unwrap(db).unwrap().into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_tags() {
        let rust = tag::Model {
            id: "t1".to_string(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rust.clone()]])
                .into_connection(),
        );

        assert_eq!(service(db).tags("a1").await.unwrap(), vec![rust]);
    }

    #[tokio::test]
    async fn test_update_sets_updater() {
        let mut edited = create_test_article("hello-world", None);
        edited.title = "Hello Again".to_string();
        edited.updater_id = Some("u2".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("hello-world", None)]])
                .append_query_results([[edited.clone()]])
                .into_connection(),
        );

        let input = UpdateArticleInput {
            title: Some("Hello Again".to_string()),
            ..Default::default()
        };
        let updated = service(db).update("a1", "u2", input).await.unwrap();

        assert_eq!(updated.updater_id.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_attach_thumbnail_rejects_extension() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db).with_storage(Arc::new(MemoryStorage::default()));

        let result = service
            .attach_thumbnail("a1", "photo.exe", b"MZ", "application/octet-stream")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_attach_thumbnail_replaces_previous() {
        let old_key = "images/thumbnails/2024/01/01/old.png";
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("hello-world", Some(old_key))]])
                .append_query_results([[create_test_article(
                    "hello-world",
                    Some("images/thumbnails/2025/01/01/new.jpg"),
                )]])
                .into_connection(),
        );
        let storage = Arc::new(MemoryStorage::default());
        let service = service(db).with_storage(storage.clone());

        service
            .attach_thumbnail("a1", "photo.JPG", b"\xff\xd8", "image/jpeg")
            .await
            .unwrap();

        let uploaded = storage.uploaded.lock().unwrap().clone();
        assert_eq!(uploaded.len(), 1);
        assert!(uploaded[0].starts_with("images/thumbnails/"));
        assert!(uploaded[0].ends_with(".jpg"));
        assert_eq!(*storage.deleted.lock().unwrap(), vec![old_key.to_string()]);
    }

    #[tokio::test]
    async fn test_attach_thumbnail_requires_storage() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .attach_thumbnail("a1", "photo.png", b"", "image/png")
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug_finds_drafts() {
        let draft = article::Model {
            status: PublicationStatus::Draft,
            ..create_test_article("hello-world", None)
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );
        let service = service(db);

        let found = service.get_by_slug("hello-world").await.unwrap();
        assert_eq!(found.editor_url(), "/article/hello-world/update");
        assert!(matches!(
            service.get_by_slug("missing").await,
            Err(AppError::ArticleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_fixed_and_status() {
        let pinned = article::Model {
            fixed: true,
            ..create_test_article("hello-world", None)
        };
        let hidden = article::Model {
            status: PublicationStatus::Draft,
            ..pinned.clone()
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("hello-world", None)]])
                .append_query_results([[pinned.clone()]])
                .append_query_results([[pinned]])
                .append_query_results([[hidden]])
                .into_connection(),
        );
        let service = service(db);

        assert!(service.set_fixed("a1", true).await.unwrap().fixed);
        let hidden = service
            .set_status("a1", PublicationStatus::Draft)
            .await
            .unwrap();
        assert!(!hidden.is_published());
    }

    #[tokio::test]
    async fn test_remove_thumbnail_deletes_file() {
        let key = "images/thumbnails/2024/01/01/old.png";
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("hello-world", Some(key))]])
                .append_query_results([[create_test_article("hello-world", None)]])
                .into_connection(),
        );
        let storage = Arc::new(MemoryStorage::default());
        let service = service(db).with_storage(storage.clone());

        let updated = service.remove_thumbnail("a1").await.unwrap();
        assert!(updated.thumbnail.is_none());
        assert_eq!(*storage.deleted.lock().unwrap(), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn test_get_detail_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        assert!(matches!(
            service(db).get_detail("nope").await,
            Err(AppError::ArticleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_unknown_tag() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        assert!(matches!(
            service(db).list_by_tag("nope", 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_category_covers_subtree() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_category()]])
                .append_query_results([vec![
                    maplit::btreemap! { "id" => Value::from("c1") },
                    maplit::btreemap! { "id" => Value::from("c2") },
                ]])
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        let items = service(db.clone())
            .with_page_size(10)
            .list_by_category("tech", 3)
            .await
            .unwrap();
        assert!(items.is_empty());

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let listing = format!("{:?}", log.last().unwrap());
        assert!(listing.contains("OFFSET"), "{listing}");
    }
}
