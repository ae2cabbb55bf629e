//! Scraper for the SET Asia programme schedule.
//!
//! ```no_run
//! # async fn demo() -> Result<(), setasia_schedule::ScheduleError> {
//! use setasia_schedule::{AppConfig, Schedule, ScheduleOptions};
//!
//! let opts = ScheduleOptions::new("en-gb").with_date(2011, 4, 7);
//! let schedule = Schedule::from_config(&opts, &AppConfig::default())?;
//! println!("{}", schedule.url());
//! print!("{}", schedule.render().await?);
//! # Ok(()) }
//! ```

pub mod config;
pub mod formatter;
pub mod models;
pub mod schedule;
pub mod scraper;

pub use self::config::{AppConfig, ConfigError, ScheduleOptions};
pub use self::models::{ListingRecord, Location, ScheduleRequest};
pub use self::schedule::{Schedule, ScheduleError};
pub use self::scraper::{FetchError, HtmlFetcher, ParseError};
