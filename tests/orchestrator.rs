//! Orchestrator Integration Tests
//!
//! Tests that a request always yields a recommendation: failing, panicking
//! and hanging taggers only remove their own modality's contribution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;

use tagrec::adapters::KeywordTagger;
use tagrec::core::FusionWeights;
use tagrec::{
    ConfigError, Modality, ModalityInput, ModalityResult, RawContent, Recommender,
    RecommenderSettings, TagVocabulary, Tagger, Taggers,
};

/// What a mock tagger does when called
enum Behavior {
    Returns(Vec<(&'static str, f64)>),
    Fails,
    Panics,
    Hangs,
}

struct MockTagger {
    modality: Modality,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockTagger {
    fn new(modality: Modality, behavior: Behavior) -> Self {
        Self {
            modality,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn returning(modality: Modality, pairs: &[(&'static str, f64)]) -> Self {
        Self::new(modality, Behavior::Returns(pairs.to_vec()))
    }
}

#[async_trait]
impl Tagger for MockTagger {
    fn name(&self) -> &str {
        "mock"
    }

    fn modality(&self) -> Modality {
        self.modality
    }

    async fn recommend(&self, _input: &ModalityInput) -> Result<ModalityResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Returns(pairs) => Ok(ModalityResult::from_pairs(pairs.iter().cloned())),
            Behavior::Fails => anyhow::bail!("model unavailable"),
            Behavior::Panics => panic!("model crashed"),
            Behavior::Hangs => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(ModalityResult::empty())
            }
        }
    }
}

fn taggers(text: MockTagger, image: MockTagger, video: MockTagger) -> Taggers {
    Taggers {
        text: Arc::new(text),
        image: Arc::new(image),
        video: Arc::new(video),
    }
}

fn content() -> RawContent {
    RawContent::new("A week of travel along the coast")
        .with_images(["https://cdn.test/beach.jpg"])
        .with_videos(["https://cdn.test/surf.mp4"])
}

#[tokio::test]
async fn test_empty_content_returns_no_tags() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::returning(Modality::Text, &[("travel", 1.0)]),
            MockTagger::returning(Modality::Image, &[("travel", 1.0)]),
            MockTagger::returning(Modality::Video, &[("travel", 1.0)]),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&RawContent::default()).await;
    assert!(rec.is_empty());
}

#[tokio::test]
async fn test_empty_inputs_skip_taggers() {
    let text = MockTagger::returning(Modality::Text, &[("science", 0.8)]);
    let image = MockTagger::returning(Modality::Image, &[("science", 1.0)]);
    let video = MockTagger::returning(Modality::Video, &[("science", 1.0)]);
    let text_calls = Arc::clone(&text.calls);
    let image_calls = Arc::clone(&image.calls);
    let video_calls = Arc::clone(&video.calls);

    let recommender =
        Recommender::new(&RecommenderSettings::default(), taggers(text, image, video)).unwrap();

    let rec = recommender
        .get_recommendations(&RawContent::new("Notes on particle physics"))
        .await;

    assert_eq!(text_calls.load(Ordering::SeqCst), 1);
    assert_eq!(image_calls.load(Ordering::SeqCst), 0);
    assert_eq!(video_calls.load(Ordering::SeqCst), 0);

    assert_eq!(rec.tags(), vec!["science"]);
    assert!((rec.scores()[0] - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_text_and_image_agree() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::returning(Modality::Text, &[("travel", 0.6)]),
            MockTagger::returning(Modality::Image, &[("travel", 0.9)]),
            MockTagger::returning(Modality::Video, &[]),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&content()).await;
    assert_eq!(rec.tags(), vec!["travel"]);
    assert!((rec.scores()[0] - 0.57).abs() < 1e-9);
}

#[tokio::test]
async fn test_failing_tagger_is_contained() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::returning(Modality::Text, &[("travel", 0.6)]),
            MockTagger::new(Modality::Image, Behavior::Fails),
            MockTagger::returning(Modality::Video, &[("travel", 1.0)]),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&content()).await;
    assert_eq!(rec.tags(), vec!["travel"]);
    assert!((rec.scores()[0] - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_panicking_tagger_is_contained() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::new(Modality::Text, Behavior::Panics),
            MockTagger::returning(Modality::Image, &[("beach", 1.0)]),
            MockTagger::new(Modality::Video, Behavior::Fails),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&content()).await;
    assert_eq!(rec.tags(), vec!["beach"]);
    assert!((rec.scores()[0] - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn test_all_taggers_failing_yields_empty() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::new(Modality::Text, Behavior::Fails),
            MockTagger::new(Modality::Image, Behavior::Panics),
            MockTagger::new(Modality::Video, Behavior::Fails),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&content()).await;
    assert!(rec.is_empty());
}

#[tokio::test]
async fn test_hanging_tagger_times_out() {
    let settings = RecommenderSettings {
        adapter_timeout_seconds: 1,
        ..Default::default()
    };
    let recommender = Recommender::new(
        &settings,
        taggers(
            MockTagger::returning(Modality::Text, &[("travel", 0.8)]),
            MockTagger::new(Modality::Image, Behavior::Hangs),
            MockTagger::returning(Modality::Video, &[]),
        ),
    )
    .unwrap();

    let started = Instant::now();
    let rec = recommender.get_recommendations(&content()).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(rec.tags(), vec!["travel"]);
    assert!((rec.scores()[0] - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::returning(Modality::Text, &[("b", 0.8), ("a", 0.8), ("c", 0.9)]),
            MockTagger::returning(Modality::Image, &[("d", 1.0), ("a", 0.1)]),
            MockTagger::returning(Modality::Video, &[("e", 1.0)]),
        ),
    )
    .unwrap();

    let first = recommender.get_recommendations(&content()).await;
    assert_eq!(first.tags(), vec!["c", "a", "b", "d"]);

    for _ in 0..5 {
        assert_eq!(recommender.get_recommendations(&content()).await, first);
    }
}

#[tokio::test]
async fn test_max_tags_limits_output() {
    let settings = RecommenderSettings {
        max_tags: 2,
        min_confidence: 0.0,
        ..Default::default()
    };
    let recommender = Recommender::new(
        &settings,
        taggers(
            MockTagger::returning(Modality::Text, &[("a", 0.9), ("b", 0.8), ("c", 0.7)]),
            MockTagger::returning(Modality::Image, &[]),
            MockTagger::returning(Modality::Video, &[]),
        ),
    )
    .unwrap();

    let rec = recommender.get_recommendations(&content()).await;
    assert_eq!(rec.tags(), vec!["a", "b"]);
}

#[test]
fn test_invalid_weights_rejected() {
    let settings = RecommenderSettings {
        weights: FusionWeights::new(0.5, 0.5, 0.5),
        ..Default::default()
    };

    let result = Recommender::new(
        &settings,
        taggers(
            MockTagger::returning(Modality::Text, &[]),
            MockTagger::returning(Modality::Image, &[]),
            MockTagger::returning(Modality::Video, &[]),
        ),
    );

    assert!(matches!(result, Err(ConfigError::WeightSum { .. })));
}

#[test]
fn test_misplaced_tagger_rejected() {
    let result = Recommender::new(
        &RecommenderSettings::default(),
        taggers(
            MockTagger::returning(Modality::Image, &[]),
            MockTagger::returning(Modality::Text, &[]),
            MockTagger::returning(Modality::Video, &[]),
        ),
    );

    assert!(matches!(
        result,
        Err(ConfigError::ModalityMismatch {
            slot: Modality::Text,
            actual: Modality::Image,
        })
    ));
}

#[tokio::test]
async fn test_keyword_taggers_end_to_end() {
    let vocabulary = Arc::new(TagVocabulary::new(["travel", "beach", "cooking"]));
    let keyword = |modality: Modality| -> Arc<dyn Tagger> {
        Arc::new(KeywordTagger::new(modality, Arc::clone(&vocabulary)))
    };

    let settings = RecommenderSettings {
        min_confidence: 0.2,
        ..Default::default()
    };
    let recommender = Recommender::new(
        &settings,
        Taggers {
            text: keyword(Modality::Text),
            image: keyword(Modality::Image),
            video: keyword(Modality::Video),
        },
    )
    .unwrap()
    .with_vocabulary_size(vocabulary.len());

    let raw = RawContent::new(
        "<p>Our travel diary: three days at the beach, then more beach time.</p>\
         <img src=\"https://cdn.test/uploads/beach-sunset.jpg\">",
    );
    let rec = recommender.get_recommendations(&raw).await;

    assert_eq!(rec.tags()[0], "beach");
    assert!(rec.tags().contains(&"travel"));
    assert!(!rec.tags().contains(&"cooking"));
    assert_eq!(recommender.describe().vocabulary_size, Some(3));
}

#[tokio::test]
async fn test_malformed_markup_degrades_gracefully() {
    let text = MockTagger::returning(Modality::Text, &[("travel", 0.8)]);
    let image = MockTagger::returning(Modality::Image, &[("beach", 1.0)]);
    let text_calls = Arc::clone(&text.calls);
    let image_calls = Arc::clone(&image.calls);

    let recommender = Recommender::new(
        &RecommenderSettings::default(),
        taggers(text, image, MockTagger::returning(Modality::Video, &[])),
    )
    .unwrap();

    // Nothing usable survives: no tagger runs, nothing is recommended
    let rec = recommender
        .get_recommendations(&RawContent::new("<<<>>><img src=\"//\""))
        .await;
    assert!(rec.is_empty());
    assert_eq!(text_calls.load(Ordering::SeqCst), 0);
    assert_eq!(image_calls.load(Ordering::SeqCst), 0);

    // Usable text next to broken markup still gets tagged
    let rec = recommender
        .get_recommendations(&RawContent::new(
            "<p>Travel notes from a long weekend on the coast</p>\n<<<>>>\n<img src=\"//\">",
        ))
        .await;
    assert_eq!(rec.tags(), vec!["travel"]);
    assert_eq!(text_calls.load(Ordering::SeqCst), 1);
    assert_eq!(image_calls.load(Ordering::SeqCst), 0);
}
