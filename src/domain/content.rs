//! Content as it enters the recommender and as the taggers see it.

use serde::{Deserialize, Serialize};

/// Raw content for a single recommendation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContent {
    /// Post body: plain text, block markup, or a full HTML document
    pub text: String,

    /// Image URLs supplied alongside the body
    #[serde(default)]
    pub images: Vec<String>,

    /// Video URLs supplied alongside the body
    #[serde(default)]
    pub videos: Vec<String>,

    /// Page the content was taken from (base for root-relative image paths)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl RawContent {
    /// Create raw content holding only a body
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_videos<I, S>(mut self, videos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.videos = videos.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// True when there is nothing to tag in any modality
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty() && self.videos.is_empty()
    }
}

/// Markup-free content ready for the per-modality taggers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalContent {
    /// Collapsed, entity-free text, truncated to the configured length
    pub text: String,

    /// Image URLs in first-seen order, without duplicates
    pub images: Vec<String>,
}

impl CanonicalContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }
}
