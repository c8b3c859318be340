//! Media storage for article thumbnails.
//!
//! Thumbnails are stored under `images/thumbnails/YYYY/MM/DD/` keyed by
//! upload date. Only a fixed set of image extensions is accepted; checking
//! the image content itself is left to the upload pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{AppError, AppResult, IdGenerator};

/// File extensions accepted for article thumbnails.
pub const ALLOWED_THUMBNAIL_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the storage root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a local storage backend from configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::StorageConfig) -> Self {
        Self::new(config.base_path.clone(), config.base_url.clone())
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));
        tracing::debug!(key = %key, size = data.len(), "Stored file");

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        tokio::fs::try_exists(self.base_path.join(key))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stat file: {e}")))
    }
}

/// Extract and check the extension of an uploaded thumbnail name.
///
/// The comparison is case-insensitive; the returned extension is lowercase.
pub fn thumbnail_extension(original_name: &str) -> AppResult<String> {
    let ext = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| original_name[pos + 1..].to_ascii_lowercase())
        .ok_or_else(|| {
            AppError::Validation(format!("Thumbnail has no file extension: {original_name}"))
        })?;

    if ALLOWED_THUMBNAIL_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "File extension \"{ext}\" is not allowed. Allowed extensions are: {}",
            ALLOWED_THUMBNAIL_EXTENSIONS.join(", ")
        )))
    }
}

/// Build the storage key for a thumbnail uploaded at `now`.
pub fn thumbnail_storage_key(original_name: &str, now: DateTime<Utc>) -> AppResult<String> {
    let ext = thumbnail_extension(original_name)?;
    let token = IdGenerator::new().generate_token();
    Ok(format!(
        "images/thumbnails/{}/{token}.{ext}",
        now.format("%Y/%m/%d")
    ))
}
