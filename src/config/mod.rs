use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::models::{Location, ScheduleRequest};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "http://www.setasia.tv";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("setasia-schedule/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SETASIA").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

// ── Request options ──────────────────────────────────────────────────────────

/// One of the three date keys of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Yyyy,
    Mm,
    Dd,
}

impl DateField {
    pub fn key(self) -> &'static str {
        match self {
            DateField::Yyyy => "yyyy",
            DateField::Mm => "mm",
            DateField::Dd => "dd",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("not a mapping")]
    NotAMapping,
    #[error("missing location")]
    MissingLocation,
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("invalid {field} value: {value}")]
    InvalidDateValue { field: DateField, value: String },
    #[error("{given} given without {missing}")]
    IncompleteDate { given: DateField, missing: DateField },
}

/// Unvalidated request parameters, as they arrive from the CLI or a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub location: Option<String>,
    pub yyyy: Option<i32>,
    pub mm: Option<u32>,
    pub dd: Option<u32>,
    /// First date key from JSON input that held something other than an integer.
    rejected_date: Option<ConfigError>,
}

impl ScheduleOptions {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn from_parts(
        location: Option<String>,
        yyyy: Option<i32>,
        mm: Option<u32>,
        dd: Option<u32>,
    ) -> Self {
        Self {
            location,
            yyyy,
            mm,
            dd,
            rejected_date: None,
        }
    }

    pub fn with_date(mut self, yyyy: i32, mm: u32, dd: u32) -> Self {
        self.yyyy = Some(yyyy);
        self.mm = Some(mm);
        self.dd = Some(dd);
        self
    }

    /// Read options from an arbitrary JSON value.
    ///
    /// Only the shape is checked here: the value must be an object. A date
    /// key holding anything but a non-negative integer (or a string of
    /// digits) is kept aside and reported by [`ScheduleOptions::validate`]
    /// after the location checks. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let map = value.as_object().ok_or(ConfigError::NotAMapping)?;

        let location = map.get("location").and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        let mut rejected_date = None;
        let yyyy = keep_date(date_value(map.get("yyyy"), DateField::Yyyy), &mut rejected_date);
        let mm = keep_date(date_value(map.get("mm"), DateField::Mm), &mut rejected_date);
        let dd = keep_date(date_value(map.get("dd"), DateField::Dd), &mut rejected_date);

        Ok(Self {
            location,
            yyyy,
            mm,
            dd,
            rejected_date,
        })
    }

    /// Validate against the current local date.
    pub fn validate(&self) -> Result<ScheduleRequest, ConfigError> {
        self.validate_on(Local::now().date_naive())
    }

    /// Validate, defaulting a fully absent date to `today`.
    pub fn validate_on(&self, today: NaiveDate) -> Result<ScheduleRequest, ConfigError> {
        let code = self
            .location
            .as_deref()
            .ok_or(ConfigError::MissingLocation)?;
        let location: Location = code.parse()?;
        if let Some(err) = &self.rejected_date {
            return Err(err.clone());
        }
        let (year, month, day) = normalize_date_on(today, self.yyyy, self.mm, self.dd)?;

        Ok(ScheduleRequest {
            location,
            year,
            month,
            day,
        })
    }
}

/// Record the first rejected date value and treat the key as absent.
fn keep_date<T>(value: Result<Option<T>, ConfigError>, rejected: &mut Option<ConfigError>) -> Option<T> {
    value.unwrap_or_else(|err| {
        rejected.get_or_insert(err);
        None
    })
}

fn date_value<T>(value: Option<&Value>, field: DateField) -> Result<Option<T>, ConfigError>
where
    T: TryFrom<u64>,
{
    let invalid = |v: &Value| ConfigError::InvalidDateValue {
        field,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Number(n)) => n
            .as_u64()
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

// ── Date defaults ────────────────────────────────────────────────────────────

/// Resolve an all-or-nothing date against today's local date.
pub fn normalize_date(
    yyyy: Option<i32>,
    mm: Option<u32>,
    dd: Option<u32>,
) -> Result<(i32, u32, u32), ConfigError> {
    normalize_date_on(Local::now().date_naive(), yyyy, mm, dd)
}

/// Month and day ranges are not checked; `2011-02-31` passes through.
pub fn normalize_date_on(
    today: NaiveDate,
    yyyy: Option<i32>,
    mm: Option<u32>,
    dd: Option<u32>,
) -> Result<(i32, u32, u32), ConfigError> {
    if let Some(err) = incomplete_date([
        (DateField::Yyyy, yyyy.is_some()),
        (DateField::Mm, mm.is_some()),
        (DateField::Dd, dd.is_some()),
    ]) {
        return Err(err);
    }

    match (yyyy, mm, dd) {
        (Some(y), Some(m), Some(d)) => Ok((y, m, d)),
        _ => Ok((today.year(), today.month(), today.day())),
    }
}

/// First (given, missing) pair, scanning given fields in yyyy, mm, dd order.
fn incomplete_date(fields: [(DateField, bool); 3]) -> Option<ConfigError> {
    fields
        .iter()
        .filter(|(_, present)| *present)
        .find_map(|&(given, _)| {
            fields
                .iter()
                .find(|(_, present)| !present)
                .map(|&(missing, _)| ConfigError::IncompleteDate { given, missing })
        })
}
