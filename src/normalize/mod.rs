//! Content normalization.
//!
//! Turns a [`RawContent`] body into [`CanonicalContent`]: markup-free text
//! plus the image URLs found in it. Three input formats are recognised:
//!
//! - `blocks`: WordPress/Gutenberg block markup, stripped with patterns
//! - `html`: full HTML documents, walked structurally
//! - plain text, only whitespace-collapsed
//!
//! Normalization is best-effort: a failure is logged and yields empty
//! content instead of an error.

pub mod blocks;
pub mod fetch;
pub mod html;

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::core::RecommenderSettings;
use crate::domain::{CanonicalContent, RawContent};

pub use fetch::ContentFetcher;

/// Appended to text cut at the length limit
pub const TRUNCATION_MARKER: &str = "...";

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref DOCUMENT_RE: Regex = Regex::new(r"(?i)<!doctype\s+html|<html[\s>]|<body[\s>]").unwrap();
}

/// Internal extraction failure, never surfaced past [`Normalizer::normalize`]
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

/// How a body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// No markup delimiters
    Plain,
    /// Fragment markup such as Gutenberg blocks
    BlockMarkup,
    /// A complete HTML document
    Html,
}

impl ContentFormat {
    pub fn detect(text: &str) -> Self {
        if !(text.contains('<') && text.contains('>')) {
            ContentFormat::Plain
        } else if DOCUMENT_RE.is_match(text) {
            ContentFormat::Html
        } else {
            ContentFormat::BlockMarkup
        }
    }
}

/// Text and images pulled out of a body before limits are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub fragments: Vec<String>,
    pub images: Vec<String>,
}

/// Normalizes raw request content
#[derive(Debug, Clone)]
pub struct Normalizer {
    max_text_length: usize,
    max_images: usize,
}

impl Normalizer {
    pub fn new(max_text_length: usize, max_images: usize) -> Self {
        Self {
            max_text_length,
            max_images,
        }
    }

    pub fn from_settings(settings: &RecommenderSettings) -> Self {
        Self::new(settings.max_text_length, settings.max_images)
    }

    /// Normalize content, degrading to empty content on failure
    pub fn normalize(&self, raw: &RawContent) -> CanonicalContent {
        match self.try_normalize(raw) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Content normalization failed, using empty content");
                CanonicalContent::default()
            }
        }
    }

    fn try_normalize(&self, raw: &RawContent) -> Result<CanonicalContent, NormalizeError> {
        let base = raw.source_url.as_deref().and_then(|u| Url::parse(u).ok());
        let format = ContentFormat::detect(&raw.text);

        let extracted = match format {
            ContentFormat::Plain => Extracted {
                fragments: vec![raw.text.clone()],
                images: Vec::new(),
            },
            ContentFormat::BlockMarkup => blocks::extract(&raw.text, base.as_ref())?,
            ContentFormat::Html => html::extract(&raw.text, base.as_ref())?,
        };

        let text = truncate_text(&combine_fragments(&extracted.fragments), self.max_text_length);
        let images = self.merge_images(&raw.images, extracted.images);

        debug!(
            ?format,
            text_chars = text.chars().count(),
            images = images.len(),
            "Normalized content"
        );

        Ok(CanonicalContent { text, images })
    }

    /// Caller-supplied images first, then extracted ones, without repeats
    fn merge_images(&self, supplied: &[String], extracted: Vec<String>) -> Vec<String> {
        let supplied = supplied
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(resolve_protocol_relative);

        let mut seen = HashSet::new();
        supplied
            .chain(extracted)
            .filter(|u| seen.insert(u.clone()))
            .take(self.max_images)
            .collect()
    }
}

/// Join fragments with single spaces and collapse whitespace
pub fn combine_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Cut `text` to `max_chars` characters, marking the cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.trim().to_string();
    }

    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated.trim().to_string()
}

/// Whether a URL points at an image: a known extension on its path, or a
/// `data:image/` URI
pub fn is_valid_image_url(url: &str) -> bool {
    if url.starts_with("data:image/") {
        return true;
    }

    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };

    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn resolve_protocol_relative(src: &str) -> String {
    match src.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => src.to_string(),
    }
}

/// Resolve an extracted `src` attribute.
///
/// Protocol-relative URLs get `https:`. Relative paths (root- or
/// document-relative) are joined to `base` and dropped when there is none.
pub fn resolve_image_src(src: &str, base: Option<&Url>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if src.starts_with("//") {
        return Some(resolve_protocol_relative(src));
    }

    if Url::parse(src).is_ok() {
        return Some(src.to_string());
    }

    base.and_then(|b| b.join(src).ok()).map(String::from)
}

/// Resolve and validity-filter a sequence of `src` attributes
pub(crate) fn collect_images<'a, I>(sources: I, base: Option<&Url>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    sources
        .into_iter()
        .filter_map(|src| resolve_image_src(src, base))
        .filter(|url| is_valid_image_url(url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(ContentFormat::detect("just words"), ContentFormat::Plain);
        assert_eq!(ContentFormat::detect("a < b"), ContentFormat::Plain);
        assert_eq!(ContentFormat::detect("<p>hi</p>"), ContentFormat::BlockMarkup);
        assert_eq!(
            ContentFormat::detect("<!DOCTYPE html><html><body>x</body></html>"),
            ContentFormat::Html
        );
        assert_eq!(
            ContentFormat::detect("<body class=\"post\"><p>x</p></body>"),
            ContentFormat::Html
        );
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_text("abcdefghijk", 10), "abcdefghij...");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_resolve_image_src() {
        let base = Url::parse("https://blog.test/posts/1").unwrap();

        assert_eq!(
            resolve_image_src("//cdn.test/a.png", None).as_deref(),
            Some("https://cdn.test/a.png")
        );
        assert_eq!(resolve_image_src("/img/a.png", None), None);
        assert_eq!(
            resolve_image_src("/img/a.png", Some(&base)).as_deref(),
            Some("https://blog.test/img/a.png")
        );
        assert_eq!(resolve_image_src("   ", None), None);

        assert_eq!(
            resolve_image_src("relative/pic.png", Some(&base)).as_deref(),
            Some("https://blog.test/posts/relative/pic.png")
        );
        assert_eq!(resolve_image_src("relative/pic.png", None), None);
        assert_eq!(
            resolve_image_src("https://cdn.test/a.png", Some(&base)).as_deref(),
            Some("https://cdn.test/a.png")
        );
    }

    #[test]
    fn test_image_url_validity() {
        assert!(is_valid_image_url("https://x.test/a.JPG"));
        assert!(is_valid_image_url("https://x.test/a.webp?w=300#top"));
        assert!(is_valid_image_url("data:image/png;base64,AAAA"));
        assert!(is_valid_image_url("photos/cat.jpeg"));
        assert!(!is_valid_image_url("https://x.test/page.html"));
        assert!(!is_valid_image_url("https://x.test/image?format=png"));
        assert!(!is_valid_image_url("data:text/plain,hello"));
    }

    #[test]
    fn test_merge_images_dedupes_and_caps() {
        let normalizer = Normalizer::new(100, 2);
        let merged = normalizer.merge_images(
            &["//cdn.test/a.png".to_string(), " ".to_string()],
            vec![
                "https://cdn.test/a.png".to_string(),
                "https://cdn.test/b.png".to_string(),
                "https://cdn.test/c.png".to_string(),
            ],
        );
        assert_eq!(merged, vec!["https://cdn.test/a.png", "https://cdn.test/b.png"]);
    }
}
