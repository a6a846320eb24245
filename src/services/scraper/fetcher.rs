use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::error::AppResult;

/// Result of a single page fetch
///
/// Transport errors, non-success statuses and timeouts are all folded into
/// `Failed` so callers never see an error from a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Page(String),
    Failed { reason: String },
}

impl FetchOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Page(_))
    }

    /// Page body, or an empty string when the fetch failed
    pub fn into_body(self) -> String {
        match self {
            FetchOutcome::Page(body) => body,
            FetchOutcome::Failed { .. } => String::new(),
        }
    }
}

/// Source of raw marketplace pages
///
/// One outbound request per call, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Fetches pages over HTTP with a shared reqwest client
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: HttpClient,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { http_client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http_client.get(url).send().await?;
        let response = response.error_for_status()?;
        response.text().await
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.try_fetch(url).await {
            Ok(body) => {
                tracing::debug!(url = %url, bytes = body.len(), "Page fetched");
                FetchOutcome::Page(body)
            }
            Err(e) if e.is_status() => {
                tracing::warn!(url = %url, status = ?e.status(), "Marketplace returned error status");
                FetchOutcome::failed(format!("HTTP error: {}", e))
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Marketplace request failed");
                FetchOutcome::failed(format!("Request error: {}", e))
            }
        }
    }
}
