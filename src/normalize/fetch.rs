//! Fetching published posts by URL.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::domain::RawContent;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Default request timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for pulling page HTML
pub struct ContentFetcher {
    client: reqwest::Client,
}

impl ContentFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch the page body as HTML
    #[instrument(skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Fetching {} returned an error status", url))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }

    /// Fetch a page as raw content, with the URL kept as the source
    pub async fn fetch(&self, url: &str) -> Result<RawContent> {
        let html = self.fetch_html(url).await?;
        Ok(RawContent::new(html).with_source_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let fetcher = ContentFetcher::with_timeout(Duration::from_millis(500)).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/post").await;
        assert!(result.is_err());
    }
}
