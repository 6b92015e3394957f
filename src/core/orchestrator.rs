//! Recommendation orchestrator.
//!
//! Normalizes the content, runs the three taggers concurrently and fuses
//! their results. A failing, hanging or panicking tagger only costs its own
//! modality; the request itself always produces a recommendation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{ModalityInput, Tagger};
use crate::domain::{Modality, ModalityResult, RawContent, Recommendation};
use crate::normalize::Normalizer;

use super::fusion::FusionEngine;
use super::settings::{ConfigError, FusionWeights, RecommenderSettings};

/// One tagger per modality
#[derive(Clone)]
pub struct Taggers {
    pub text: Arc<dyn Tagger>,
    pub image: Arc<dyn Tagger>,
    pub video: Arc<dyn Tagger>,
}

impl Taggers {
    fn slots(&self) -> [(Modality, &Arc<dyn Tagger>); 3] {
        [
            (Modality::Text, &self.text),
            (Modality::Image, &self.image),
            (Modality::Video, &self.video),
        ]
    }
}

/// Name of the tagger serving a modality
#[derive(Debug, Clone, Serialize)]
pub struct TaggerInfo {
    pub modality: Modality,
    pub name: String,
}

/// Snapshot of the recommender's configuration
#[derive(Debug, Clone, Serialize)]
pub struct RecommenderInfo {
    pub taggers: Vec<TaggerInfo>,
    pub weights: FusionWeights,
    pub min_confidence: f64,
    pub max_tags: usize,
    pub max_text_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_size: Option<usize>,
}

/// Main recommendation entry point
pub struct Recommender {
    settings: RecommenderSettings,
    normalizer: Normalizer,
    engine: FusionEngine,
    taggers: Taggers,
    vocabulary_size: Option<usize>,
}

impl Recommender {
    /// Create a recommender, validating settings and tagger placement
    pub fn new(settings: &RecommenderSettings, taggers: Taggers) -> Result<Self, ConfigError> {
        settings.validate()?;

        for (slot, tagger) in taggers.slots() {
            let actual = tagger.modality();
            if actual != slot {
                return Err(ConfigError::ModalityMismatch { slot, actual });
            }
        }

        Ok(Self {
            settings: settings.clone(),
            normalizer: Normalizer::from_settings(settings),
            engine: FusionEngine::new(settings.fusion_config())?,
            taggers,
            vocabulary_size: None,
        })
    }

    /// Record the size of the vocabulary the taggers draw from
    pub fn with_vocabulary_size(mut self, size: usize) -> Self {
        self.vocabulary_size = Some(size);
        self
    }

    /// Recommend tags for one piece of content.
    ///
    /// Never fails: problems in any stage degrade to fewer (or no) tags.
    #[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn get_recommendations(&self, raw: &RawContent) -> Recommendation {
        let started = Instant::now();

        let canonical = self.normalizer.normalize(raw);
        let videos: Vec<String> = raw
            .videos
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .take(self.settings.max_videos)
            .map(str::to_string)
            .collect();

        debug!(
            text_chars = canonical.text.chars().count(),
            images = canonical.images.len(),
            videos = videos.len(),
            "Running taggers"
        );

        let (text, image, video) = tokio::join!(
            self.run_tagger(&self.taggers.text, ModalityInput::Text(canonical.text)),
            self.run_tagger(&self.taggers.image, ModalityInput::Images(canonical.images)),
            self.run_tagger(&self.taggers.video, ModalityInput::Videos(videos)),
        );

        let recommendation = self.engine.fuse(&text, &image, &video);

        info!(
            tags = recommendation.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Generated recommendations"
        );

        recommendation
    }

    /// Run one tagger on its own task, bounded by the adapter timeout
    async fn run_tagger(&self, tagger: &Arc<dyn Tagger>, input: ModalityInput) -> ModalityResult {
        let modality = input.modality();
        if input.is_empty() {
            debug!(%modality, "No input for modality, skipping tagger");
            return ModalityResult::empty();
        }

        let name = tagger.name().to_string();
        let timeout = self.settings.adapter_timeout();
        let tagger = Arc::clone(tagger);
        let started = Instant::now();

        let mut handle = tokio::spawn(async move { tagger.recommend(&input).await });

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(Ok(result))) => {
                debug!(
                    %modality,
                    tagger = %name,
                    candidates = result.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tagger completed"
                );
                result
            }
            Ok(Ok(Err(e))) => {
                warn!(%modality, tagger = %name, error = %e, "Tagger failed, continuing without it");
                ModalityResult::empty()
            }
            Ok(Err(e)) => {
                warn!(%modality, tagger = %name, error = %e, "Tagger task aborted, continuing without it");
                ModalityResult::empty()
            }
            Err(_) => {
                handle.abort();
                warn!(
                    %modality,
                    tagger = %name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Tagger timed out, continuing without it"
                );
                ModalityResult::empty()
            }
        }
    }

    /// Describe the configured taggers and fusion parameters
    pub fn describe(&self) -> RecommenderInfo {
        RecommenderInfo {
            taggers: self
                .taggers
                .slots()
                .into_iter()
                .map(|(modality, tagger)| TaggerInfo {
                    modality,
                    name: tagger.name().to_string(),
                })
                .collect(),
            weights: self.settings.weights,
            min_confidence: self.settings.min_confidence,
            max_tags: self.settings.max_tags,
            max_text_length: self.settings.max_text_length,
            vocabulary_size: self.vocabulary_size,
        }
    }

    /// Health-check every tagger, reporting failures by modality
    pub async fn health_check(&self) -> Vec<(Modality, anyhow::Result<()>)> {
        let (text, image, video) = tokio::join!(
            self.taggers.text.health_check(),
            self.taggers.image.health_check(),
            self.taggers.video.health_check(),
        );
        vec![
            (Modality::Text, text),
            (Modality::Image, image),
            (Modality::Video, video),
        ]
    }
}
