//! The tag vocabulary shared read-only by all taggers.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

/// Tags used when no vocabulary file is configured
const DEFAULT_TAGS: &[&str] = &[
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "robotics",
    "programming",
    "software",
    "technology",
    "science",
    "research",
    "education",
    "health",
    "fitness",
    "food",
    "cooking",
    "recipe",
    "travel",
    "nature",
    "beach",
    "mountains",
    "city",
    "architecture",
    "photography",
    "art",
    "design",
    "music",
    "film",
    "video",
    "sports",
    "football",
    "business",
    "finance",
    "startup",
    "marketing",
    "politics",
    "history",
    "culture",
    "fashion",
    "lifestyle",
    "family",
    "pets",
    "animals",
    "environment",
    "climate",
    "space",
    "gaming",
];

/// Ordered, deduplicated list of lower-case tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVocabulary {
    tags: Vec<String>,
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TagVocabulary {
    /// Build from any list of tags.
    ///
    /// Tags are trimmed and lower-cased; blanks and repeats are dropped.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let tags = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Self { tags }
    }

    /// The built-in vocabulary
    pub fn builtin() -> Self {
        Self::new(DEFAULT_TAGS)
    }

    /// Parse a vocabulary file: one tag per line, `#` starts a comment line
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    /// Load a vocabulary file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file: {}", path.display()))?;

        let vocabulary = Self::parse(&content);
        if vocabulary.is_empty() {
            anyhow::bail!("Vocabulary file contains no tags: {}", path.display());
        }
        Ok(vocabulary)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
