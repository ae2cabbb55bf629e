//! Schedule for one location and day: request, URL, listings, rendering.
//!
//! `listings()` hits the network on every call. `render()` and `to_json()`
//! share a per-instance memo, so the page is fetched at most once for them.

use crate::config::{AppConfig, ConfigError, ScheduleOptions};
use crate::formatter;
use crate::models::{ListingRecord, ScheduleRequest};
use crate::scraper::{FetchError, HtmlFetcher, HttpClient, ScrapeError, SetAsiaScraper};
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid schedule request: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error("failed to encode listings: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<FetchError> for ScheduleError {
    fn from(e: FetchError) -> Self {
        ScheduleError::Scrape(e.into())
    }
}

pub struct Schedule<F = HttpClient> {
    request: ScheduleRequest,
    scraper: SetAsiaScraper<F>,
    listings: OnceCell<Vec<ListingRecord>>,
}

impl Schedule<HttpClient> {
    /// Validate `options` and wire up the HTTP client from configuration.
    pub fn from_config(options: &ScheduleOptions, config: &AppConfig) -> Result<Self, ScheduleError> {
        let request = options.validate()?;
        let scraper = SetAsiaScraper::new(&config.scraper)?;
        Ok(Self::new(request, scraper))
    }
}

impl<F: HtmlFetcher> Schedule<F> {
    pub fn new(request: ScheduleRequest, scraper: SetAsiaScraper<F>) -> Self {
        Self {
            request,
            scraper,
            listings: OnceCell::new(),
        }
    }

    pub fn request(&self) -> &ScheduleRequest {
        &self.request
    }

    pub fn url(&self) -> String {
        self.scraper.schedule_url(&self.request)
    }

    /// Fetch and parse the page now, bypassing the memo.
    pub async fn listings(&self) -> Result<Vec<ListingRecord>, ScheduleError> {
        Ok(self.scraper.fetch_listings(&self.request).await?)
    }

    /// Listings from the memo, fetching on first use.
    pub async fn cached_listings(&self) -> Result<&[ListingRecord], ScheduleError> {
        let listings = self
            .listings
            .get_or_try_init(|| self.listings())
            .await?;
        Ok(listings.as_slice())
    }

    pub async fn render(&self) -> Result<String, ScheduleError> {
        Ok(formatter::render(self.cached_listings().await?))
    }

    pub async fn to_json(&self) -> Result<String, ScheduleError> {
        Ok(formatter::render_json(self.cached_listings().await?)?)
    }
}
