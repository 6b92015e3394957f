//! Vocabulary phrase-matching tagger.
//!
//! Scores each vocabulary tag by how often its phrase occurs in the input:
//! the text body for text, or the words of each URL path (file names such
//! as `beach-sunset.jpg`) for images and videos. A tag seen `c` times
//! scores `c / (c + 1)`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::domain::{Modality, ModalityResult, TagVocabulary};

use super::{ModalityInput, Tagger};

/// Default number of candidates returned
pub const DEFAULT_TOP_K: usize = 20;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// Tagger that needs nothing but the vocabulary
pub struct KeywordTagger {
    modality: Modality,
    vocabulary: Arc<TagVocabulary>,
    top_k: usize,
}

impl KeywordTagger {
    pub fn new(modality: Modality, vocabulary: Arc<TagVocabulary>) -> Self {
        Self {
            modality,
            vocabulary,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Score every vocabulary tag against already tokenized input
    fn score_tokens(&self, tokens: &[String]) -> ModalityResult {
        let mut scored: Vec<(String, f64)> = self
            .vocabulary
            .iter()
            .filter_map(|tag| {
                let phrase = tokenize(tag);
                let count = count_phrase(tokens, &phrase);
                (count > 0).then(|| (tag.to_string(), count as f64 / (count as f64 + 1.0)))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(self.top_k);

        ModalityResult::from_pairs(scored)
    }
}

#[async_trait]
impl Tagger for KeywordTagger {
    fn name(&self) -> &str {
        "keyword"
    }

    fn modality(&self) -> Modality {
        self.modality
    }

    async fn recommend(&self, input: &ModalityInput) -> Result<ModalityResult> {
        if input.is_empty() {
            return Ok(ModalityResult::empty());
        }

        let tokens = match input {
            ModalityInput::Text(text) => tokenize(text),
            ModalityInput::Images(urls) | ModalityInput::Videos(urls) => urls
                .iter()
                .filter(|url| !url.starts_with("data:"))
                .flat_map(|url| tokenize(&url_path(url)))
                .collect(),
        };

        Ok(self.score_tokens(&tokens))
    }
}

/// Lower-cased word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The path part of a URL, or the whole string when it does not parse
fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Non-overlapping occurrences of `phrase` in `tokens`
fn count_phrase(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || tokens.len() < phrase.len() {
        return 0;
    }

    let mut count = 0;
    let mut i = 0;
    while i + phrase.len() <= tokens.len() {
        let window = &tokens[i..i + phrase.len()];
        if window.iter().zip(phrase).all(|(t, p)| token_matches(t, p)) {
            count += 1;
            i += phrase.len();
        } else {
            i += 1;
        }
    }
    count
}

/// Exact match, or a simple plural of the tag word
fn token_matches(token: &str, tag_word: &str) -> bool {
    token == tag_word
        || token
            .strip_prefix(tag_word)
            .is_some_and(|suffix| suffix == "s" || suffix == "es")
}
