use crate::domain::errors::ValidationError;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Value Object - Unix timestamp in whole seconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_secs(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Seconds elapsed from `self` to `later`.
    pub fn seconds_until(&self, later: Timestamp) -> i64 {
        later.0.saturating_sub(self.0)
    }
}

/// Value Object - Series identity (the price service's `crypto_id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(u32);

impl SeriesId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Value Object - Ticker symbol, stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.trim().to_uppercase())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Value Object - One observed price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: Timestamp, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Value Object - Trailing time window in whole hours, always within [1, 24]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[display(fmt = "{}h", hours)]
pub struct ViewWindow {
    hours: u8,
}

impl ViewWindow {
    pub const MIN_HOURS: i64 = 1;
    pub const MAX_HOURS: i64 = 24;

    pub fn new(hours: i64) -> Result<Self, ValidationError> {
        if !(Self::MIN_HOURS..=Self::MAX_HOURS).contains(&hours) {
            return Err(ValidationError::WindowOutOfRange(hours));
        }
        Ok(Self { hours: hours as u8 })
    }

    pub fn hours(&self) -> u32 {
        self.hours as u32
    }

    pub fn seconds(&self) -> i64 {
        self.hours as i64 * 3600
    }
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self { hours: Self::MAX_HOURS as u8 }
    }
}

impl<'de> Deserialize<'de> for ViewWindow {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hours = i64::deserialize(deserializer)?;
        ViewWindow::new(hours).map_err(serde::de::Error::custom)
    }
}
