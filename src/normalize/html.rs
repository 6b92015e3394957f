//! Structural extraction from full HTML documents.
//!
//! Content containers are tried in priority order; the first one holding
//! substantial visible text wins. Pages without any recognizable container
//! fall back to the text of the whole document.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{collapse_whitespace, collect_images, Extracted, NormalizeError};

/// Content containers, most specific first
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".content",
    "main",
    "body",
];

/// Fragments this short are navigation or boilerplate
pub const MIN_CONTENT_CHARS: usize = 50;

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract visible text and image URLs from an HTML document
pub fn extract(html: &str, base: Option<&Url>) -> Result<Extracted, NormalizeError> {
    let document = Html::parse_document(html);

    Ok(Extracted {
        fragments: content_fragments(&document)?,
        images: image_sources(&document, base)?,
    })
}

fn content_fragments(document: &Html) -> Result<Vec<String>, NormalizeError> {
    for css in CONTENT_SELECTORS {
        let selector = selector(css)?;
        let mut kept = Vec::new();
        let mut fragments = Vec::new();

        // Matches arrive in document order; skip those inside a kept match
        for element in document.select(&selector) {
            if element.ancestors().any(|node| kept.contains(&node.id())) {
                continue;
            }

            let text = visible_text(element);
            if text.chars().count() > MIN_CONTENT_CHARS {
                kept.push(element.id());
                fragments.push(text);
            }
        }

        if !fragments.is_empty() {
            return Ok(fragments);
        }
    }

    let whole = visible_text(document.root_element());
    Ok(if whole.is_empty() { Vec::new() } else { vec![whole] })
}

fn image_sources(document: &Html, base: Option<&Url>) -> Result<Vec<String>, NormalizeError> {
    let img = selector("img")?;
    let sources = document
        .select(&img)
        .filter_map(|element| element.value().attr("src"));

    Ok(collect_images(sources, base))
}

/// Text of an element and its descendants, hidden elements skipped
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_visible_text(element, &mut parts);
    collapse_whitespace(&parts.join(" "))
}

fn collect_visible_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        } else if let Some(child) = ElementRef::wrap(child) {
            if !HIDDEN_ELEMENTS.contains(&child.value().name()) {
                collect_visible_text(child, parts);
            }
        }
    }
}

fn selector(css: &str) -> Result<Selector, NormalizeError> {
    Selector::parse(css).map_err(|e| NormalizeError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
