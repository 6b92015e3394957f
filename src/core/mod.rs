//! Core recommendation logic.
//!
//! This module contains:
//! - Settings: Tunables and configuration validation
//! - Fusion: Weighted merging of per-modality results
//! - Orchestrator: Normalize, tag and fuse a single request

pub mod fusion;
pub mod orchestrator;
pub mod settings;

// Re-export commonly used types
pub use fusion::FusionEngine;
pub use orchestrator::{Recommender, RecommenderInfo, TaggerInfo, Taggers};
pub use settings::{ConfigError, FusionConfig, FusionWeights, RecommenderSettings};
