//! Configuration for tagrec.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TAGREC_MIN_CONFIDENCE, TAGREC_MAX_TAGS,
//!    TAGREC_VOCABULARY)
//! 2. Config file (TAGREC_CONFIG, or .tagrec/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - TAGREC_CONFIG names the file explicitly
//! - Otherwise searches current directory and parents for .tagrec/config.yaml,
//!   then ~/.tagrec/config.yaml
//! - Paths in the config file are relative to the project root (the
//!   directory holding .tagrec/)

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{build_tagger, TaggerSpec};
use crate::core::{Recommender, RecommenderSettings, Taggers};
use crate::domain::{Modality, TagVocabulary};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub recommender: RecommenderSettings,
    /// Vocabulary file (relative to the project root)
    #[serde(default)]
    pub vocabulary: Option<String>,
    #[serde(default)]
    pub taggers: TaggersConfig,
}

/// Tagger implementation per modality
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggersConfig {
    #[serde(default)]
    pub text: TaggerSpec,
    #[serde(default)]
    pub image: TaggerSpec,
    #[serde(default)]
    pub video: TaggerSpec,
}

impl TaggersConfig {
    pub fn for_modality(&self, modality: Modality) -> &TaggerSpec {
        match modality {
            Modality::Text => &self.text,
            Modality::Image => &self.image,
            Modality::Video => &self.video,
        }
    }
}

/// Resolved, validated configuration
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Recommender tunables
    pub settings: RecommenderSettings,
    /// Absolute path to the vocabulary file (built-in list if none)
    pub vocabulary: Option<PathBuf>,
    /// Tagger selection
    pub taggers: TaggersConfig,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Load the configured vocabulary, or the built-in one
    pub fn load_vocabulary(&self) -> Result<TagVocabulary> {
        match &self.vocabulary {
            Some(path) => TagVocabulary::from_file(path),
            None => Ok(TagVocabulary::builtin()),
        }
    }

    /// Build a recommender with the configured taggers
    pub fn build_recommender(&self) -> Result<Recommender> {
        let vocabulary = Arc::new(self.load_vocabulary()?);
        let timeout = self.settings.adapter_timeout();

        let tagger = |modality: Modality| {
            build_tagger(
                modality,
                self.taggers.for_modality(modality),
                Arc::clone(&vocabulary),
                timeout,
            )
            .with_context(|| format!("Failed to build {} tagger", modality))
        };

        let taggers = Taggers {
            text: tagger(Modality::Text)?,
            image: tagger(Modality::Image)?,
            video: tagger(Modality::Video)?,
        };

        let recommender = Recommender::new(&self.settings, taggers)
            .context("Invalid recommender configuration")?
            .with_vocabulary_size(vocabulary.len());
        Ok(recommender)
    }
}

/// Find config file: explicit env var, then current directory and parents,
/// then the home directory
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("TAGREC_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;
    loop {
        let config_path = current.join(".tagrec").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".tagrec").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Apply environment overrides on top of file settings
fn apply_env_overrides<F>(settings: &mut RecommenderSettings, env: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env("TAGREC_MIN_CONFIDENCE") {
        settings.min_confidence = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid TAGREC_MIN_CONFIDENCE: {}", value))?;
    }

    if let Some(value) = env("TAGREC_MAX_TAGS") {
        settings.max_tags = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid TAGREC_MAX_TAGS: {}", value))?;
    }

    Ok(())
}

/// Resolve configuration from an optional file and an environment lookup
fn resolve_config<F>(config_file: Option<PathBuf>, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut settings, file_vocabulary, taggers) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Project root is the parent of .tagrec/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        let vocabulary = config
            .vocabulary
            .as_deref()
            .map(|v| resolve_path(base_dir, v));

        (config.recommender, vocabulary, config.taggers)
    } else {
        (RecommenderSettings::default(), None, TaggersConfig::default())
    };

    apply_env_overrides(&mut settings, &env)?;

    let vocabulary = env("TAGREC_VOCABULARY")
        .map(PathBuf::from)
        .or(file_vocabulary);

    settings
        .validate()
        .context("Invalid recommender settings")?;

    Ok(ResolvedConfig {
        settings,
        vocabulary,
        taggers,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    resolve_config(find_config_file(), |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let tagrec_dir = temp.path().join(".tagrec");
        std::fs::create_dir_all(&tagrec_dir).unwrap();

        let config_path = tagrec_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, no_env).unwrap();

        assert_eq!(config.settings, RecommenderSettings::default());
        assert!(config.vocabulary.is_none());
        assert_eq!(config.taggers, TaggersConfig::default());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1.0"
recommender:
  max_tags: 5
  min_confidence: 0.25
  weights:
    text: 0.6
    image: 0.4
    video: 0.0
vocabulary: data/tags.txt
taggers:
  image:
    kind: http
    endpoint: http://localhost:8500/clip
"#,
        );

        let config = resolve_config(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.settings.max_tags, 5);
        assert_eq!(config.settings.min_confidence, 0.25);
        assert_eq!(config.settings.weights.image, 0.4);
        assert_eq!(config.vocabulary, Some(temp.path().join("data/tags.txt")));
        assert_eq!(config.taggers.text, TaggerSpec::Keyword);
        assert_eq!(
            config.taggers.image,
            TaggerSpec::Http {
                endpoint: "http://localhost:8500/clip".into()
            }
        );
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1.0\"\nrecommender:\n  max_tags: 5\n");

        let env: HashMap<&str, &str> = [
            ("TAGREC_MAX_TAGS", "3"),
            ("TAGREC_MIN_CONFIDENCE", "0.5"),
            ("TAGREC_VOCABULARY", "/srv/tags.txt"),
        ]
        .into_iter()
        .collect();

        let config =
            resolve_config(Some(config_path), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.settings.max_tags, 3);
        assert_eq!(config.settings.min_confidence, 0.5);
        assert_eq!(config.vocabulary, Some(PathBuf::from("/srv/tags.txt")));
    }

    #[test]
    fn test_invalid_weights_fail_fast() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            "version: \"1.0\"\nrecommender:\n  weights:\n    text: 0.9\n    image: 0.9\n",
        );

        let result = resolve_config(Some(config_path), no_env);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_env_value() {
        let result = resolve_config(None, |k| {
            (k == "TAGREC_MAX_TAGS").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_build_recommender_with_vocabulary_file() {
        let temp = TempDir::new().unwrap();
        let vocab_path = temp.path().join("tags.txt");
        std::fs::write(&vocab_path, "science\nspace\n").unwrap();

        let config = ResolvedConfig {
            vocabulary: Some(vocab_path),
            ..Default::default()
        };

        let recommender = config.build_recommender().unwrap();
        let info = recommender.describe();
        assert_eq!(info.vocabulary_size, Some(2));
        assert!(info.taggers.iter().all(|t| t.name == "keyword"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
