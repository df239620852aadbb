//! Wire shapes of the price service and their conversion into domain types.
//!
//! Everything loosely typed stops here: timestamps are normalized to Unix
//! seconds, prices are checked and histories come out sorted.

use crate::domain::errors::NetworkError;
use crate::domain::market_data::{
    CryptoAsset, CurrentPrice, PriceHistory, PricePoint, RegressionResult, RemoteRegression, SeriesId, Symbol,
    Timestamp,
};
use crate::time_utils::parse_timestamp;
use chrono::FixedOffset;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Decode a response body, failing on any `status` other than `"success"`.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, NetworkError> {
    let probe: StatusProbe = serde_json::from_str(body).map_err(decode_error)?;
    if probe.status != "success" {
        return Err(NetworkError::ServiceStatus {
            status: probe.status,
            message: probe.message.unwrap_or_default(),
        });
    }
    serde_json::from_str(body).map_err(decode_error)
}

fn decode_error(error: serde_json::Error) -> NetworkError {
    NetworkError::Decode(error.to_string())
}

#[derive(Debug, Deserialize)]
struct StatusProbe {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Unix seconds as a number, or any text layout `parse_timestamp` accepts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Unix(i64),
    Text(String),
}

impl RawTimestamp {
    pub fn to_domain(&self, offset: &FixedOffset) -> Result<Timestamp, NetworkError> {
        match self {
            RawTimestamp::Unix(secs) => Ok(Timestamp::from_secs(*secs)),
            RawTimestamp::Text(raw) => parse_timestamp(raw, offset)
                .map(Timestamp::from_secs)
                .ok_or_else(|| NetworkError::Decode(format!("unrecognized timestamp '{raw}'"))),
        }
    }
}

fn checked_price(price: f64) -> Result<f64, NetworkError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(NetworkError::Decode(format!("invalid price {price}")))
    }
}

fn sorted(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.sort_by_key(|p| p.timestamp);
    points
}

#[derive(Debug, Deserialize)]
pub struct CryptoDto {
    pub id: u32,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CryptoListBody {
    pub data: Vec<CryptoDto>,
}

impl CryptoListBody {
    pub fn into_domain(self) -> Vec<CryptoAsset> {
        self.data
            .into_iter()
            .map(|c| CryptoAsset { id: SeriesId::new(c.id), symbol: Symbol::from(c.symbol), name: c.name })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrentPriceDto {
    pub id: u32,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub timestamp: RawTimestamp,
}

#[derive(Debug, Deserialize)]
pub struct CurrentPricesBody {
    pub data: Vec<CurrentPriceDto>,
}

impl CurrentPricesBody {
    pub fn into_domain(self, offset: &FixedOffset) -> Result<Vec<CurrentPrice>, NetworkError> {
        self.data
            .into_iter()
            .map(|dto| {
                Ok(CurrentPrice {
                    id: SeriesId::new(dto.id),
                    symbol: Symbol::from(dto.symbol),
                    name: dto.name,
                    price: checked_price(dto.price)?,
                    timestamp: dto.timestamp.to_domain(offset)?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryPointDto {
    pub price: f64,
    pub timestamp: RawTimestamp,
    #[serde(default)]
    pub timestamp_unix: Option<i64>,
}

impl HistoryPointDto {
    fn to_domain(&self, offset: &FixedOffset) -> Result<PricePoint, NetworkError> {
        let timestamp = match self.timestamp_unix {
            Some(secs) => Timestamp::from_secs(secs),
            None => self.timestamp.to_domain(offset)?,
        };
        Ok(PricePoint::new(timestamp, checked_price(self.price)?))
    }
}

fn points_from(data: &[HistoryPointDto], offset: &FixedOffset) -> Result<Vec<PricePoint>, NetworkError> {
    data.iter().map(|p| p.to_domain(offset)).collect::<Result<Vec<_>, _>>().map(sorted)
}

/// `/prices/history`
#[derive(Debug, Deserialize)]
pub struct HistoryBody {
    #[serde(default)]
    pub crypto_id: Option<u32>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub data: Vec<HistoryPointDto>,
}

impl HistoryBody {
    /// `requested` identifies the series when the body omits `crypto_id`.
    pub fn into_domain(self, requested: SeriesId, offset: &FixedOffset) -> Result<PriceHistory, NetworkError> {
        let id = self.crypto_id.map(SeriesId::new).unwrap_or(requested);
        if id != requested {
            return Err(NetworkError::Decode(format!("asked for series {requested}, got {id}")));
        }
        Ok(PriceHistory {
            id,
            symbol: Symbol::from(self.symbol),
            name: self.name,
            points: points_from(&self.data, offset)?,
        })
    }
}

/// One row of the per-symbol maps in `/prices/all-cryptos` and `/prices/compare`.
#[derive(Debug, Deserialize)]
pub struct TaggedPointDto {
    pub crypto_id: u32,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub timestamp: RawTimestamp,
    /// Hour of day, only sent by `/prices/compare`.
    #[serde(default)]
    pub hour: Option<u8>,
}

/// `/prices/all-cryptos` and `/prices/compare`
#[derive(Debug, Deserialize)]
pub struct GroupedHistoryBody {
    pub data: BTreeMap<String, Vec<TaggedPointDto>>,
}

impl GroupedHistoryBody {
    /// One history per asset, ordered by id; empty groups are skipped.
    pub fn into_domain(self, offset: &FixedOffset) -> Result<Vec<PriceHistory>, NetworkError> {
        let mut histories = Vec::with_capacity(self.data.len());
        for (key, rows) in self.data {
            let Some(first) = rows.first() else {
                continue;
            };
            let id = SeriesId::new(first.crypto_id);
            let symbol = if first.symbol.is_empty() { key } else { first.symbol.clone() };
            let name = first.name.clone();
            let points = rows
                .iter()
                .map(|row| {
                    if row.crypto_id != id.value() {
                        return Err(NetworkError::Decode(format!(
                            "group {symbol} mixes series {id} and {}",
                            row.crypto_id
                        )));
                    }
                    Ok(PricePoint::new(row.timestamp.to_domain(offset)?, checked_price(row.price)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            histories.push(PriceHistory { id, symbol: Symbol::from(symbol), name, points: sorted(points) });
        }
        histories.sort_by_key(|h| h.id);
        Ok(histories)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegressionDto {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub equation: String,
    pub data_points: usize,
}

/// `/prices/regression`
#[derive(Debug, Deserialize)]
pub struct RegressionBody {
    #[serde(default)]
    pub crypto_id: Option<u32>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub data: Vec<HistoryPointDto>,
    pub regression: RegressionDto,
}

impl RegressionBody {
    pub fn into_domain(self, requested: SeriesId, offset: &FixedOffset) -> Result<RemoteRegression, NetworkError> {
        let RegressionBody { crypto_id, symbol, name, data, regression } = self;
        let history = HistoryBody { crypto_id, symbol, name, data }.into_domain(requested, offset)?;
        let r_squared = (regression.data_points >= 2 && regression.r_squared.is_finite())
            .then(|| regression.r_squared.clamp(0.0, 1.0));
        Ok(RemoteRegression {
            history,
            result: RegressionResult {
                slope: regression.slope,
                intercept: regression.intercept,
                r_squared,
                sample_count: regression.data_points,
            },
            equation: regression.equation,
        })
    }
}
