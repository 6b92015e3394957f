//! Weighted fusion of per-modality tagger results.
//!
//! Each tag's fused score is the weighted sum of its score in every
//! modality, with absent tags contributing zero. Tags below the confidence
//! threshold are dropped, the rest ranked by score with ties broken by tag.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::{FusedTag, ModalityResult, Recommendation};

use super::settings::{ConfigError, FusionConfig};

/// Combines the three modality results into one ranking
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    /// Create an engine, rejecting invalid weights or thresholds
    pub fn new(config: FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fuse text, image and video results into a recommendation
    pub fn fuse(
        &self,
        text: &ModalityResult,
        image: &ModalityResult,
        video: &ModalityResult,
    ) -> Recommendation {
        let text_scores = score_map(text);
        let image_scores = score_map(image);
        let video_scores = score_map(video);

        let all_tags: BTreeSet<&str> = text_scores
            .keys()
            .chain(image_scores.keys())
            .chain(video_scores.keys())
            .copied()
            .collect();

        let weights = &self.config.weights;
        let mut fused: Vec<FusedTag> = all_tags
            .into_iter()
            .filter_map(|tag| {
                let combined = weights.text * text_scores.get(tag).copied().unwrap_or(0.0)
                    + weights.image * image_scores.get(tag).copied().unwrap_or(0.0)
                    + weights.video * video_scores.get(tag).copied().unwrap_or(0.0);
                let combined = combined.clamp(0.0, 1.0);

                (combined >= self.config.min_confidence).then(|| FusedTag::new(tag, combined))
            })
            .collect();

        fused.sort_by(rank_order);
        let candidates = fused.len();
        fused.truncate(self.config.max_tags);

        debug!(
            candidates,
            returned = fused.len(),
            min_confidence = self.config.min_confidence,
            "Fused modality results"
        );

        Recommendation::from_ranked(fused)
    }
}

/// Tag to score, keeping the first occurrence of a repeated tag
fn score_map(result: &ModalityResult) -> HashMap<&str, f64> {
    let mut scores = HashMap::with_capacity(result.len());
    for (tag, score) in result.iter() {
        scores.entry(tag).or_insert(score);
    }
    scores
}

/// Score descending, then tag ascending
fn rank_order(a: &FusedTag, b: &FusedTag) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.tag.cmp(&b.tag))
}
