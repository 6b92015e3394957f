//! Tagger interfaces for the per-modality classifiers.
//!
//! Each modality (text, image, video) is served by one [`Tagger`]. The
//! recommender only relies on this contract; the models behind it live
//! elsewhere. Two implementations ship with the crate:
//! - `keyword`: vocabulary phrase matching, no model required
//! - `http`: a client for an external inference service

pub mod http;
pub mod keyword;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Modality, ModalityResult, TagVocabulary};

pub use http::HttpTagger;
pub use keyword::KeywordTagger;

/// The canonical slice of content a tagger receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityInput {
    Text(String),
    Images(Vec<String>),
    Videos(Vec<String>),
}

impl ModalityInput {
    pub fn modality(&self) -> Modality {
        match self {
            ModalityInput::Text(_) => Modality::Text,
            ModalityInput::Images(_) => Modality::Image,
            ModalityInput::Videos(_) => Modality::Video,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ModalityInput::Text(text) => text.trim().is_empty(),
            ModalityInput::Images(urls) | ModalityInput::Videos(urls) => urls.is_empty(),
        }
    }
}

/// A per-modality tag classifier
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Human-readable tagger name
    fn name(&self) -> &str;

    /// The modality this tagger understands
    fn modality(&self) -> Modality;

    /// Candidate tags for the input, scores in `[0, 1]`.
    ///
    /// Empty input yields an empty result, not an error.
    async fn recommend(&self, input: &ModalityInput) -> Result<ModalityResult>;

    /// Health check (for remote taggers)
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Which tagger implementation serves a modality
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaggerSpec {
    /// Vocabulary phrase matching
    #[default]
    Keyword,

    /// Remote inference service
    Http { endpoint: String },
}

/// Build the tagger described by `spec` for one modality
pub fn build_tagger(
    modality: Modality,
    spec: &TaggerSpec,
    vocabulary: Arc<TagVocabulary>,
    timeout: Duration,
) -> Result<Arc<dyn Tagger>> {
    let tagger: Arc<dyn Tagger> = match spec {
        TaggerSpec::Keyword => Arc::new(KeywordTagger::new(modality, vocabulary)),
        TaggerSpec::Http { endpoint } => Arc::new(HttpTagger::new(modality, endpoint, timeout)?),
    };
    Ok(tagger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_emptiness() {
        assert!(ModalityInput::Text("  \n".into()).is_empty());
        assert!(!ModalityInput::Text("words".into()).is_empty());
        assert!(ModalityInput::Images(vec![]).is_empty());
        assert_eq!(
            ModalityInput::Videos(vec!["v.mp4".into()]).modality(),
            Modality::Video
        );
    }

    #[test]
    fn test_tagger_spec_yaml() {
        let spec: TaggerSpec = serde_yaml::from_str("kind: keyword").unwrap();
        assert_eq!(spec, TaggerSpec::Keyword);

        let spec: TaggerSpec =
            serde_yaml::from_str("kind: http\nendpoint: http://localhost:8500/clip").unwrap();
        assert_eq!(
            spec,
            TaggerSpec::Http {
                endpoint: "http://localhost:8500/clip".into()
            }
        );
    }

    #[test]
    fn test_build_tagger() {
        let vocab = Arc::new(TagVocabulary::builtin());
        let tagger = build_tagger(
            Modality::Image,
            &TaggerSpec::Keyword,
            vocab,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(tagger.modality(), Modality::Image);
        assert_eq!(tagger.name(), "keyword");
    }
}
