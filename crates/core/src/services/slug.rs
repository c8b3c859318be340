//! Unique slug derivation.

use std::future::Future;

use quill_common::{AppError, AppResult, IdGenerator, slugify, with_suffix};

/// Numbered candidates tried before falling back to a random suffix.
const MAX_NUMBERED_ATTEMPTS: u32 = 100;

/// Pick the slug to store for a row.
///
/// An explicit `requested` slug is normalized and must be free. Without one,
/// the slug is derived from `title` (or `fallback` when the title has no
/// usable characters) and suffixed `-2`, `-3`, ... until `taken` reports a
/// free candidate.
pub async fn unique_slug<F, Fut>(
    requested: Option<&str>,
    title: &str,
    fallback: &str,
    mut taken: F,
) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
        let slug = slugify(requested);
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "Slug must contain letters or digits: {requested}"
            )));
        }
        if taken(slug.clone()).await? {
            return Err(AppError::Conflict(format!("Slug already in use: {slug}")));
        }
        return Ok(slug);
    }

    let mut base = slugify(title);
    if base.is_empty() {
        base = fallback.to_string();
    }

    if !taken(base.clone()).await? {
        return Ok(base);
    }

    for n in 2..=MAX_NUMBERED_ATTEMPTS {
        let candidate = with_suffix(&base, n);
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    let candidate = with_suffix(&base, IdGenerator::new().generate());
    tracing::warn!(slug = %candidate, "Numbered slugs exhausted, using random suffix");
    Ok(candidate)
}
