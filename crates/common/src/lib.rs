//! Common utilities and shared types for quill.
//!
//! This crate provides foundational components used across all quill crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Slugs**: URL-safe identifiers derived from titles via [`slugify`]
//! - **Storage**: File storage backends for article thumbnails
//!
//! # Example
//!
//! ```no_run
//! use quill_common::{AppResult, Config, IdGenerator, slugify};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id = IdGenerator::new().generate();
//!     println!("{} {} {}", config.blog.default_author_id, id, slugify("Hello World"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod slug;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use self::slug::{slugify, with_suffix};
pub use storage::{
    ALLOWED_THUMBNAIL_EXTENSIONS, LocalStorage, StorageBackend, UploadedFile,
    thumbnail_extension, thumbnail_storage_key,
};
