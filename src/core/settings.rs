//! Recommender settings and their validation.
//!
//! Settings are plain values loaded once at startup. Anything invalid is
//! reported as a [`ConfigError`] before the first request is served:
//! - Fusion weights (finite, non-negative, summing to 1.0)
//! - Confidence threshold in `[0, 1]`
//! - Output and input limits

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Modality;

/// Allowed drift of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-modality weights applied during fusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    #[serde(default = "default_text_weight")]
    pub text: f64,

    #[serde(default = "default_image_weight")]
    pub image: f64,

    #[serde(default = "default_video_weight")]
    pub video: f64,
}

fn default_text_weight() -> f64 {
    0.5
}
fn default_image_weight() -> f64 {
    0.3
}
fn default_video_weight() -> f64 {
    0.2
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text: default_text_weight(),
            image: default_image_weight(),
            video: default_video_weight(),
        }
    }
}

impl FusionWeights {
    pub fn new(text: f64, image: f64, video: f64) -> Self {
        Self { text, image, video }
    }

    pub fn for_modality(&self, modality: Modality) -> f64 {
        match modality {
            Modality::Text => self.text,
            Modality::Image => self.image,
            Modality::Video => self.video,
        }
    }

    pub fn sum(&self) -> f64 {
        self.text + self.image + self.video
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for modality in Modality::ALL {
            let value = self.for_modality(modality);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { modality, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Parameters of the fusion step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    pub weights: FusionWeights,
    pub min_confidence: f64,
    pub max_tags: usize,
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::MinConfidence {
                value: self.min_confidence,
            });
        }
        Ok(())
    }
}

/// All tunables of the recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderSettings {
    /// Maximum number of tags returned (default: 10)
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    /// Fused scores below this are dropped (default: 0.3)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Per-modality fusion weights (default: 0.5 / 0.3 / 0.2)
    #[serde(default)]
    pub weights: FusionWeights,

    /// Canonical text length in characters before truncation (default: 2048)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Images passed to the image tagger (default: 10)
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Videos passed to the video tagger (default: 5)
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,

    /// Per-tagger timeout in seconds (default: 30)
    #[serde(default = "default_adapter_timeout")]
    pub adapter_timeout_seconds: u64,
}

fn default_max_tags() -> usize {
    10
}
fn default_min_confidence() -> f64 {
    0.3
}
fn default_max_text_length() -> usize {
    2048
}
fn default_max_images() -> usize {
    10
}
fn default_max_videos() -> usize {
    5
}
fn default_adapter_timeout() -> u64 {
    30
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            max_tags: default_max_tags(),
            min_confidence: default_min_confidence(),
            weights: FusionWeights::default(),
            max_text_length: default_max_text_length(),
            max_images: default_max_images(),
            max_videos: default_max_videos(),
            adapter_timeout_seconds: default_adapter_timeout(),
        }
    }
}

impl RecommenderSettings {
    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            weights: self.weights,
            min_confidence: self.min_confidence,
            max_tags: self.max_tags,
        }
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fusion_config().validate()?;
        if self.max_text_length == 0 {
            return Err(ConfigError::MaxTextLength);
        }
        Ok(())
    }
}

/// Static misconfiguration detected at startup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Fusion weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("Fusion weight for {modality} must be finite and non-negative, got {value}")]
    InvalidWeight { modality: Modality, value: f64 },

    #[error("min_confidence must lie in [0, 1], got {value}")]
    MinConfidence { value: f64 },

    #[error("max_text_length must be greater than zero")]
    MaxTextLength,

    #[error("The {slot} tagger slot was given a {actual} tagger")]
    ModalityMismatch { slot: Modality, actual: Modality },
}
