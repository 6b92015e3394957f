//! tagrec - Multi-modal tag recommender
//!
//! Recommends a ranked set of tags for blog content (text, embedded
//! images, optionally video) by fusing the output of independent
//! per-modality taggers.
//!
//! # Architecture
//!
//! A request flows through three stages:
//! - Normalization: raw text, block markup or HTML becomes canonical text
//!   plus image URLs
//! - Tagging: one tagger per modality proposes scored tags, concurrently
//! - Fusion: scores are combined with fixed weights, thresholded, ranked
//!
//! Failures never abort a request; they shrink the recommendation.
//!
//! # Modules
//!
//! - `adapters`: Tagger trait and the bundled taggers
//! - `core`: Fusion engine, orchestrator, settings
//! - `domain`: Data structures (content, results, vocabulary)
//! - `normalize`: Content normalization and fetching
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Recommend tags for a post
//! tagrec recommend --input post.html --image https://example.com/beach.jpg
//!
//! # Recommend tags for a published page
//! tagrec recommend --url https://blog.example.com/my-post --json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod normalize;

// Re-export main types at crate root for convenience
pub use adapters::{ModalityInput, Tagger};
pub use crate::core::{ConfigError, FusionEngine, Recommender, RecommenderSettings, Taggers};
pub use domain::{
    CanonicalContent, FusedTag, Modality, ModalityResult, RawContent, Recommendation,
    TagVocabulary,
};
pub use normalize::Normalizer;
