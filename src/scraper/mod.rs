pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::{ListingRecord, Location, ScheduleRequest};
use thiserror::Error;
use tracing::{debug, info};

pub use self::http_client::{FetchError, HtmlFetcher, HttpClient};
pub use self::parsers::ParseError;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Schedule page URL, e.g. `http://www.setasia.tv/en-gb/schedule#2011-04-07`.
/// Years past 9999 are written as-is.
pub fn schedule_url(base_url: &str, location: Location, year: i32, month: u32, day: u32) -> String {
    format!(
        "{}/{}/schedule#{:04}-{:02}-{:02}",
        base_url.trim_end_matches('/'),
        location.code(),
        year,
        month,
        day
    )
}

// ── SET Asia scraper ──────────────────────────────────────────────────────────

pub struct SetAsiaScraper<F = HttpClient> {
    fetcher: F,
    base_url: String,
}

impl SetAsiaScraper<HttpClient> {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self::with_fetcher(HttpClient::new(config)?, &config.base_url))
    }
}

impl<F: HtmlFetcher> SetAsiaScraper<F> {
    pub fn with_fetcher(fetcher: F, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn schedule_url(&self, req: &ScheduleRequest) -> String {
        schedule_url(&self.base_url, req.location, req.year, req.month, req.day)
    }

    /// One fetch, one parse.
    pub async fn fetch_listings(
        &self,
        req: &ScheduleRequest,
    ) -> Result<Vec<ListingRecord>, ScrapeError> {
        let url = self.schedule_url(req);
        info!("Fetching {} schedule ({})", req.location.display_name(), url);

        let html = self.fetcher.fetch(&url).await?;
        let listings = parsers::extract(&html, &self.base_url)?;

        debug!("{}: {} listings", url, listings.len());
        Ok(listings)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubFetcher;
    use super::*;

    fn request(location: Location, year: i32, month: u32, day: u32) -> ScheduleRequest {
        ScheduleRequest {
            location,
            year,
            month,
            day,
        }
    }

    #[test]
    fn test_schedule_url_zero_pads() {
        assert_eq!(
            schedule_url("http://www.setasia.tv", Location::UnitedKingdom, 2011, 4, 7),
            "http://www.setasia.tv/en-gb/schedule#2011-04-07"
        );
        assert_eq!(
            schedule_url("http://www.setasia.tv/", Location::Canada, 999, 12, 25),
            "http://www.setasia.tv/en-ca/schedule#0999-12-25"
        );
        assert_eq!(
            schedule_url("http://www.setasia.tv", Location::Malaysia, 12345, 1, 1),
            "http://www.setasia.tv/en-my/schedule#12345-01-01"
        );
    }

    #[tokio::test]
    async fn test_fetch_listings_requests_schedule_url() {
        let stub = StubFetcher::ok(
            r#"<tbody><tr><td>9:00 PM</td><td><a href="/en-us/shows/cid">CID</a></td></tr></tbody>"#,
        );
        let scraper = SetAsiaScraper::with_fetcher(stub, "http://www.setasia.tv/");
        let req = request(Location::UnitedStates, 2012, 11, 3);

        let listings = scraper.fetch_listings(&req).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(
            listings[0].url.as_deref(),
            Some("http://www.setasia.tv/en-us/shows/cid")
        );
        assert_eq!(
            *scraper.fetcher.requests.lock().unwrap(),
            vec!["http://www.setasia.tv/en-us/schedule#2012-11-03".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_url() {
        let scraper = SetAsiaScraper::with_fetcher(StubFetcher::failing("HTTP 404"), "http://www.setasia.tv");
        let req = request(Location::UnitedKingdom, 2011, 4, 7);

        match scraper.fetch_listings(&req).await {
            Err(ScrapeError::Fetch(e)) => {
                assert_eq!(e.url, "http://www.setasia.tv/en-gb/schedule#2011-04-07");
                assert_eq!(e.reason, "HTTP 404");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(scraper.fetcher.request_count(), 1);
    }
}
