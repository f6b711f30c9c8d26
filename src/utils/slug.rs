use unicode_normalization::UnicodeNormalization;

/// Default maximum slug length used for directory and memory file names
pub const DEFAULT_MAX_SLUG_LEN: usize = 50;

/// Slug used when nothing survives normalization
pub const FALLBACK_SLUG: &str = "untitled";

/// Converts arbitrary text into a filesystem-safe slug
///
/// The text is NFKD-decomposed, stripped of non-ASCII code points and lowercased. Every run
/// of characters outside `[a-z0-9]` becomes one hyphen, and hyphens are trimmed from both
/// ends. Slugs longer than `max_len` are cut back to the last whole hyphen-delimited word.
/// `max_len` is never taken below the length of [`FALLBACK_SLUG`], so the result of
/// `slugify` always slugifies to itself.
///
/// # Examples
///
/// ```
/// use chat_ffs::utils::slugify;
///
/// assert_eq!(slugify("Python Data Processing Help", 50), "python-data-processing-help");
/// assert_eq!(slugify("Café  Crème!", 50), "cafe-creme");
/// assert_eq!(slugify("こんにちは", 50), "untitled");
/// ```
pub fn slugify(text: &str, max_len: usize) -> String {
    let max_len = max_len.max(FALLBACK_SLUG.len());
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.nfkd().filter(char::is_ascii) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > max_len {
        truncate_at_word(&mut slug, max_len);
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    slug
}

// Slug is pure ASCII so byte indices are char boundaries.
fn truncate_at_word(slug: &mut String, max_len: usize) {
    let ends_on_boundary = slug.as_bytes().get(max_len) == Some(&b'-');
    slug.truncate(max_len);
    if ends_on_boundary {
        return;
    }
    if let Some(pos) = slug.rfind('-') {
        slug.truncate(pos);
    }
}
