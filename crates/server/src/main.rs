//! quill entry point.
//!
//! Connects to the database, applies pending migrations and makes sure the
//! default author exists, so the schema and fallback user are ready before
//! any content is written.

use std::sync::Arc;

use quill_common::{Config, LocalStorage};
use quill_core::{ArticleService, CategoryService, UserService};
use quill_db::repositories::{
    ArticleRepository, CategoryRepository, RatingRepository, TagRepository, UserRepository,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,sea_orm=info".into()),
        )
        .init();

    info!("Starting quill...");

    // QUILL_CONFIG points at a single file instead of the config/ directory.
    let config = match std::env::var("QUILL_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load()?,
    };

    let db = Arc::new(quill_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    let users = UserService::new(UserRepository::new(db.clone()), &config.blog);
    let author = users.ensure_default_author().await?;
    info!(
        user_id = %author.id,
        name = author.display_name(),
        "Default author ready"
    );

    let article_repo = ArticleRepository::new(db.clone());
    let category_repo = CategoryRepository::new(db.clone());
    let categories = CategoryService::new(category_repo.clone(), article_repo.clone());
    let articles = ArticleService::new(
        article_repo,
        category_repo,
        TagRepository::new(db.clone()),
        RatingRepository::new(db.clone()),
    )
    .with_storage(Arc::new(LocalStorage::from_config(&config.storage)))
    .with_page_size(config.blog.page_size);

    let roots = categories.roots().await?;
    let published = articles.count_published().await?;
    info!(
        categories = roots.len(),
        published_articles = published,
        "quill is ready"
    );

    Ok(())
}
