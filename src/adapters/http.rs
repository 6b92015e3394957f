//! HTTP client for an external inference service.
//!
//! The service receives the modality input as JSON:
//! `{"modality": "text", "text": "..."}` or
//! `{"modality": "image", "urls": ["..."]}` and answers with parallel
//! `{"tags": [...], "scores": [...]}` arrays.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Modality, ModalityResult};

use super::{ModalityInput, Tagger};

/// Request body sent to the inference service
#[derive(Debug, Serialize)]
struct TagRequest<'a> {
    modality: Modality,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    urls: Option<&'a [String]>,
}

/// Response from the inference service
#[derive(Debug, Deserialize)]
struct TagResponse {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    scores: Vec<f64>,
}

/// Tagger backed by a remote model server
pub struct HttpTagger {
    modality: Modality,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTagger {
    pub fn new(modality: Modality, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            modality,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.endpoint)
    }

    fn request_body<'a>(&self, input: &'a ModalityInput) -> TagRequest<'a> {
        match input {
            ModalityInput::Text(text) => TagRequest {
                modality: self.modality,
                text: Some(text.as_str()),
                urls: None,
            },
            ModalityInput::Images(urls) | ModalityInput::Videos(urls) => TagRequest {
                modality: self.modality,
                text: None,
                urls: Some(urls.as_slice()),
            },
        }
    }
}

#[async_trait]
impl Tagger for HttpTagger {
    fn name(&self) -> &str {
        "http"
    }

    fn modality(&self) -> Modality {
        self.modality
    }

    async fn recommend(&self, input: &ModalityInput) -> Result<ModalityResult> {
        if input.is_empty() {
            return Ok(ModalityResult::empty());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(input))
            .send()
            .await
            .with_context(|| format!("Failed to reach {} tagger at {}", self.modality, self.endpoint))?
            .error_for_status()
            .with_context(|| format!("{} tagger returned an error status", self.modality))?;

        let body: TagResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} tagger response", self.modality))?;

        debug!(modality = %self.modality, tags = body.tags.len(), "Remote tagger responded");

        Ok(ModalityResult::from_parallel(body.tags, body.scores)?)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.health_url())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.health_url()))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "{} tagger health check failed: {}",
                self.modality,
                response.status()
            );
        }

        Ok(())
    }
}
