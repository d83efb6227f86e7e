//! Listing page retrieval

use async_trait::async_trait;
use std::time::Duration;

/// Source of listing page markup
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page body. Any failure aborts the current run.
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the listing page over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(
        url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Errors reaching or reading the listing page
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Page returned status {0}")]
    Status(u16),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Unparseable markup: {0}")]
    Markup(String),
}
