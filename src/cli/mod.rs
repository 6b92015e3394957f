//! Command-line interface for tagrec.
//!
//! Provides commands for recommending tags, inspecting normalization,
//! listing the vocabulary, and checking configuration and tagger health.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config;
use crate::domain::RawContent;
use crate::normalize::{ContentFetcher, Normalizer};

/// tagrec - Multi-modal tag recommender
#[derive(Parser, Debug)]
#[command(name = "tagrec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the post body comes from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input file (reads from stdin if not provided)
    #[arg(short, long, conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Read input from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Fetch the post from a URL instead
    #[arg(short, long)]
    pub url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recommend tags for a post
    Recommend {
        #[command(flatten)]
        input: InputArgs,

        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Video URL (repeatable)
        #[arg(long = "video")]
        videos: Vec<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show the canonical text and images extracted from a post
    Normalize {
        #[command(flatten)]
        input: InputArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// List the tag vocabulary
    Tags {
        /// Maximum number of tags to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show taggers and fusion parameters
    Info,

    /// Show resolved configuration (debug)
    Config,

    /// Check that every tagger is reachable
    Health,
}

/// Recommendation as printed with `--json`
#[derive(Debug, Serialize)]
struct RecommendationResponse {
    tags: Vec<String>,
    confidence_scores: Vec<f64>,
    generated_at: DateTime<Utc>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Recommend {
                input,
                images,
                videos,
                json,
            } => recommend(input, images, videos, json).await,
            Commands::Normalize { input, json } => normalize(input, json).await,
            Commands::Tags { limit } => list_tags(limit),
            Commands::Info => show_info(),
            Commands::Config => show_config(),
            Commands::Health => health().await,
        }
    }
}

/// Recommend tags for the given post
async fn recommend(
    input: InputArgs,
    images: Vec<String>,
    videos: Vec<String>,
    json: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let recommender = cfg.build_recommender()?;

    let raw = read_content(&input)
        .await?
        .with_images(images)
        .with_videos(videos);

    let recommendation = recommender.get_recommendations(&raw).await;

    if json {
        let (tags, confidence_scores) = recommendation.into_parts();
        let response = RecommendationResponse {
            tags,
            confidence_scores,
            generated_at: Utc::now(),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if recommendation.is_empty() {
        println!("No tags above the confidence threshold");
        return Ok(());
    }

    println!("{:<30} {:>8}", "TAG", "SCORE");
    println!("{}", "-".repeat(39));
    for fused in recommendation.iter() {
        println!("{:<30} {:>8.3}", fused.tag, fused.score);
    }

    Ok(())
}

/// Print the normalized form of the given post
async fn normalize(input: InputArgs, json: bool) -> Result<()> {
    let cfg = config::config()?;
    let normalizer = Normalizer::from_settings(&cfg.settings);

    let raw = read_content(&input).await?;
    let canonical = normalizer.normalize(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&canonical)?);
        return Ok(());
    }

    println!("Text ({} chars):", canonical.text.chars().count());
    println!("{}", canonical.text);
    println!();
    println!("Images ({}):", canonical.images.len());
    for image in &canonical.images {
        println!("  {}", image);
    }

    Ok(())
}

/// List vocabulary tags
fn list_tags(limit: Option<usize>) -> Result<()> {
    let cfg = config::config()?;
    let vocabulary = cfg.load_vocabulary()?;

    for tag in vocabulary.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", tag);
    }
    eprintln!("\n[{} tags total]", vocabulary.len());

    Ok(())
}

/// Show recommender info as JSON
fn show_info() -> Result<()> {
    let cfg = config::config()?;
    let recommender = cfg.build_recommender()?;

    println!("{}", serde_json::to_string_pretty(&recommender.describe())?);
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;
    let settings = &cfg.settings;

    println!("tagrec configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!(
        "Vocabulary:  {}",
        cfg.vocabulary
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in)".to_string())
    );
    println!();
    println!("Fusion:");
    println!(
        "  Weights:         text {} / image {} / video {}",
        settings.weights.text, settings.weights.image, settings.weights.video
    );
    println!("  Min confidence:  {}", settings.min_confidence);
    println!("  Max tags:        {}", settings.max_tags);
    println!();
    println!("Limits:");
    println!("  Max text length: {} chars", settings.max_text_length);
    println!("  Max images:      {}", settings.max_images);
    println!("  Max videos:      {}", settings.max_videos);
    println!("  Tagger timeout:  {}s", settings.adapter_timeout_seconds);
    println!();
    println!("Taggers:");
    println!("  Text:  {:?}", cfg.taggers.text);
    println!("  Image: {:?}", cfg.taggers.image);
    println!("  Video: {:?}", cfg.taggers.video);

    Ok(())
}

/// Health-check every tagger
async fn health() -> Result<()> {
    let cfg = config::config()?;
    let recommender = cfg.build_recommender()?;

    let mut failures = 0;
    for (modality, result) in recommender.health_check().await {
        match result {
            Ok(()) => println!("{:<6} ok", modality),
            Err(e) => {
                failures += 1;
                println!("{:<6} FAILED: {:#}", modality, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} tagger(s) unhealthy", failures);
    }
    Ok(())
}

/// Read the post body from a URL, a file, or stdin
async fn read_content(input: &InputArgs) -> Result<RawContent> {
    if let Some(url) = &input.url {
        let fetcher = ContentFetcher::new()?;
        return fetcher.fetch(url).await;
    }

    let text = if let Some(path) = &input.input {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if input.stdin || !io::stdin().is_terminal() {
        // Read from stdin if --stdin flag or if stdin is piped
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file>, --url <url> or pipe to stdin");
    };

    Ok(RawContent::new(text))
}
