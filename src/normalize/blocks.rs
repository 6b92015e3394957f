//! Block markup (WordPress/Gutenberg) extraction.
//!
//! Block content is a sequence of markup fragments separated by line
//! breaks, with `<!-- wp:... -->` comments delimiting blocks. Tags are
//! stripped by pattern rather than parsed, so unbalanced markup is fine.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::{collect_images, Extracted, NormalizeError};

/// Fragments this short are empty blocks or boilerplate
pub const MIN_FRAGMENT_CHARS: usize = 20;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref IMG_SRC_RE: Regex =
        Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"'>]+)["']"#).unwrap();
}

/// Extract paragraph text and image URLs from block markup
pub fn extract(markup: &str, base: Option<&Url>) -> Result<Extracted, NormalizeError> {
    Ok(Extracted {
        fragments: text_fragments(markup),
        images: image_sources(markup, base),
    })
}

/// Substantial text fragments, tags replaced by spaces and entities decoded
pub fn text_fragments(markup: &str) -> Vec<String> {
    let stripped = TAG_RE.replace_all(markup, " ");
    let decoded = html_escape::decode_html_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_FRAGMENT_CHARS)
        .map(str::to_string)
        .collect()
}

/// `img` sources found in the raw markup
pub fn image_sources(markup: &str, base: Option<&Url>) -> Vec<String> {
    let sources = IMG_SRC_RE
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());

    collect_images(sources, base)
}
