use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

// ── Location catalog ──────────────────────────────────────────────────────────

/// Regional feeds served by the schedule site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "en-gb")]
    UnitedKingdom,
    #[serde(rename = "en-us")]
    UnitedStates,
    #[serde(rename = "en-ca")]
    Canada,
    #[serde(rename = "en-au")]
    Australia,
    #[serde(rename = "en-za")]
    SouthAfrica,
    #[serde(rename = "en-ae")]
    MiddleEast,
    #[serde(rename = "en-sg")]
    Singapore,
    #[serde(rename = "en-my")]
    Malaysia,
}

impl Location {
    pub const ALL: [Location; 8] = [
        Location::UnitedKingdom,
        Location::UnitedStates,
        Location::Canada,
        Location::Australia,
        Location::SouthAfrica,
        Location::MiddleEast,
        Location::Singapore,
        Location::Malaysia,
    ];

    /// Locale code as it appears in the page path, e.g. `en-gb`.
    pub fn code(self) -> &'static str {
        match self {
            Location::UnitedKingdom => "en-gb",
            Location::UnitedStates => "en-us",
            Location::Canada => "en-ca",
            Location::Australia => "en-au",
            Location::SouthAfrica => "en-za",
            Location::MiddleEast => "en-ae",
            Location::Singapore => "en-sg",
            Location::Malaysia => "en-my",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Location::UnitedKingdom => "United Kingdom",
            Location::UnitedStates => "United States",
            Location::Canada => "Canada",
            Location::Australia => "Australia",
            Location::SouthAfrica => "South Africa",
            Location::MiddleEast => "Middle East",
            Location::Singapore => "Singapore",
            Location::Malaysia => "Malaysia",
        }
    }

    /// Look up the display name for a locale code.
    pub fn resolve(code: &str) -> Result<&'static str, ConfigError> {
        code.parse::<Location>().map(Location::display_name)
    }
}

impl FromStr for Location {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|loc| loc.code() == s)
            .ok_or_else(|| ConfigError::InvalidLocation(s.to_string()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// A validated schedule request. Built through `ScheduleOptions::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub location: Location,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

// ── Listing ───────────────────────────────────────────────────────────────────

/// One programme slot parsed from a schedule row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub time: Option<String>, // "HH:MM AM" / "HH:MM PM"
    pub title: Option<String>,
    pub url: Option<String>,
}

pub const MISSING_URL: &str = "N/A";

impl ListingRecord {
    pub fn url_or_missing(&self) -> &str {
        self.url.as_deref().unwrap_or(MISSING_URL)
    }
}
