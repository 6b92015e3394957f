//! Per-modality tagger output and the fused recommendation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One content channel, each handled by its own tagger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Text,
    Image,
    Video,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Text, Modality::Image, Modality::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Modality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "bert" => Ok(Modality::Text),
            "image" | "clip" => Ok(Modality::Image),
            "video" => Ok(Modality::Video),
            _ => anyhow::bail!("Unknown modality: {}", s),
        }
    }
}

/// Parallel tag/score vectors that do not line up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Tagger returned {tags} tags but {scores} scores")]
pub struct ResultShapeError {
    pub tags: usize,
    pub scores: usize,
}

/// Candidate tags from a single tagger, in the tagger's own order.
///
/// Scores are clamped into `[0, 1]` on construction; NaN becomes `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityResult {
    entries: Vec<(String, f64)>,
}

impl ModalityResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(tag, score)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(tag, score)| (tag.into(), clamp_score(score)))
                .collect(),
        }
    }

    /// Build from parallel vectors, as returned over the wire
    pub fn from_parallel(tags: Vec<String>, scores: Vec<f64>) -> Result<Self, ResultShapeError> {
        if tags.len() != scores.len() {
            return Err(ResultShapeError {
                tags: tags.len(),
                scores: scores.len(),
            });
        }
        Ok(Self::from_pairs(tags.into_iter().zip(scores)))
    }

    pub fn tags(&self) -> Vec<&str> {
        self.entries.iter().map(|(tag, _)| tag.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, score)| *score).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(tag, score)| (tag.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// A tag with its fused confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedTag {
    pub tag: String,
    pub score: f64,
}

impl FusedTag {
    pub fn new(tag: impl Into<String>, score: f64) -> Self {
        Self {
            tag: tag.into(),
            score,
        }
    }
}

/// Ranked, thresholded tags for one piece of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    tags: Vec<FusedTag>,
}

impl Recommendation {
    /// Wrap tags that are already ranked
    pub(crate) fn from_ranked(tags: Vec<FusedTag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.tags.iter().map(|t| t.score).collect()
    }

    /// Split into the parallel `(tags, scores)` vectors callers expect
    pub fn into_parts(self) -> (Vec<String>, Vec<f64>) {
        self.tags.into_iter().map(|t| (t.tag, t.score)).unzip()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FusedTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl IntoIterator for Recommendation {
    type Item = FusedTag;
    type IntoIter = std::vec::IntoIter<FusedTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}
