use super::value_objects::{PricePoint, SeriesId, Symbol, Timestamp};
use super::regression::RegressionResult;
use crate::domain::chart::Color;
use serde::{Deserialize, Serialize};

/// Domain entity - A tradable asset known to the price service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoAsset {
    pub id: SeriesId,
    pub symbol: Symbol,
    pub name: String,
}

/// Domain entity - Latest quote for an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub id: SeriesId,
    pub symbol: Symbol,
    pub name: String,
    pub price: f64,
    pub timestamp: Timestamp,
}

/// Raw history for one asset as returned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: SeriesId,
    pub symbol: Symbol,
    pub name: String,
    pub points: Vec<PricePoint>,
}

/// History plus the trend the service computed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRegression {
    pub history: PriceHistory,
    pub result: RegressionResult,
    pub equation: String,
}

/// Domain entity - One displayable price series.
///
/// `points` must be sorted ascending by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: SeriesId,
    pub label: String,
    pub color: Color,
    pub points: Vec<PricePoint>,
}

impl Series {
    pub fn new(id: SeriesId, label: impl Into<String>, color: Color, points: Vec<PricePoint>) -> Self {
        Self { id, label: label.into(), color, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same identity and color with a different set of points.
    pub fn with_points(&self, points: Vec<PricePoint>) -> Self {
        Self {
            id: self.id,
            label: self.label.clone(),
            color: self.color,
            points,
        }
    }
}
