//! Domain types for the tag recommender.
//!
//! This module contains the core data structures:
//! - Content: Raw request content and its canonical form
//! - Recommendation: Per-modality results and the fused ranking
//! - Vocabulary: The shared tag list

pub mod content;
pub mod recommendation;
pub mod vocabulary;

// Re-export commonly used types
pub use content::{CanonicalContent, RawContent};
pub use recommendation::{FusedTag, Modality, ModalityResult, Recommendation, ResultShapeError};
pub use vocabulary::TagVocabulary;
