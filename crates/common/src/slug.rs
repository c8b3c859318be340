//! Slug derivation.
//!
//! Slugs are lowercase ASCII words joined by single hyphens. Cyrillic letters
//! go through a fixed Russian transliteration table; everything else is
//! handed to `slug`, which folds accents and scripts to ASCII.

/// Maximum slug length, matching the `slug` column size.
pub const MAX_SLUG_LEN: usize = 255;

/// Convert a title to a slug.
///
/// Returns an empty string when the title contains nothing that can be
/// represented; callers pick their own fallback in that case.
///
/// ```
/// use quill_common::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Привет мир"), "privet-mir");
/// assert_eq!(slugify("Café crème"), "cafe-creme");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut latin = String::with_capacity(title.len());
    for ch in title.chars().flat_map(char::to_lowercase) {
        match transliterate(ch) {
            Some(piece) => latin.push_str(piece),
            None => latin.push(ch),
        }
    }

    truncate(&::slug::slugify(latin), MAX_SLUG_LEN).to_string()
}

/// Append a `-suffix` to a slug, shortening the base if needed so the
/// result still fits in [`MAX_SLUG_LEN`].
///
/// ```
/// use quill_common::with_suffix;
///
/// assert_eq!(with_suffix("hello-world", 2), "hello-world-2");
/// ```
#[must_use]
pub fn with_suffix(base: &str, suffix: impl std::fmt::Display) -> String {
    let suffix = format!("-{suffix}");
    let base = truncate(base, MAX_SLUG_LEN - suffix.len()).trim_end_matches('-');
    format!("{base}{suffix}")
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    // Slugs are ASCII, so any byte index is a char boundary.
    s[..max].trim_end_matches('-')
}

/// Latin rendering of a lowercase Cyrillic letter. Hard and soft signs map to
/// an empty string: they are dropped without splitting the word.
const fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(s)
}
