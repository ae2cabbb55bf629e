use crate::config::ScraperConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("failed to fetch {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Retrieves the raw body of a page. One call is one round trip.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::new(&config.base_url, format!("client build: {e}")))?;

        Ok(Self { inner })
    }
}

#[async_trait]
impl HtmlFetcher for HttpClient {
    /// No retries; a non-2xx status is a failure.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::new(url, format!("HTTP {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::new(url, format!("reading body: {e}")))?;

        debug!("{}: {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}
