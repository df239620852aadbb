pub mod dto;

use crate::config::AppConfig;
use crate::domain::errors::{NetworkError, NetworkResult};
use crate::domain::logging::{LogComponent, LogEntry, LogLevel, get_logger};
use crate::{log_debug, log_warn};
use crate::domain::market_data::{
    CryptoAsset, CurrentPrice, PriceHistory, PriceRepository, RemoteRegression, SeriesId, ViewWindow,
};
use chrono::FixedOffset;
use dto::{CryptoListBody, CurrentPricesBody, GroupedHistoryBody, HistoryBody, RegressionBody, decode_envelope};
use gloo_net::http::Request;

/// Hour-of-day bounds accepted by `/prices/compare` and `/prices/regression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl Default for HourRange {
    fn default() -> Self {
        Self { start: 0, end: 24 }
    }
}

/// REST client for the price service
#[derive(Debug, Clone)]
pub struct PriceApiClient {
    base_url: String,
    server_offset: FixedOffset,
}

impl PriceApiClient {
    pub fn new(base_url: impl Into<String>, server_offset: FixedOffset) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, server_offset }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.base_url(), config.server_offset())
    }

    pub fn cryptos_url(&self) -> String {
        format!("{}/cryptos", self.base_url)
    }

    pub fn current_prices_url(&self) -> String {
        format!("{}/prices/current", self.base_url)
    }

    pub fn history_url(&self, id: SeriesId, window: ViewWindow) -> String {
        format!("{}/prices/history?crypto_id={}&hours={}", self.base_url, id, window.hours())
    }

    pub fn all_cryptos_url(&self, window: ViewWindow) -> String {
        format!("{}/prices/all-cryptos?hours={}", self.base_url, window.hours())
    }

    pub fn compare_url(&self, ids: &[SeriesId], hours: HourRange) -> String {
        let ids = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        format!(
            "{}/prices/compare?crypto_ids={}&start_hour={}&end_hour={}",
            self.base_url, ids, hours.start, hours.end
        )
    }

    pub fn regression_url(&self, id: SeriesId, hours: HourRange) -> String {
        format!(
            "{}/prices/regression?crypto_id={}&start_hour={}&end_hour={}",
            self.base_url, id, hours.start, hours.end
        )
    }

    pub async fn list_assets(&self) -> NetworkResult<Vec<CryptoAsset>> {
        let body: CryptoListBody = self.get(self.cryptos_url()).await?;
        Ok(body.into_domain())
    }

    pub async fn current_prices(&self) -> NetworkResult<Vec<CurrentPrice>> {
        let body: CurrentPricesBody = self.get(self.current_prices_url()).await?;
        body.into_domain(&self.server_offset)
    }

    pub async fn price_history(&self, id: SeriesId, window: ViewWindow) -> NetworkResult<PriceHistory> {
        let body: HistoryBody = self.get(self.history_url(id, window)).await?;
        body.into_domain(id, &self.server_offset)
    }

    pub async fn all_cryptos(&self, window: ViewWindow) -> NetworkResult<Vec<PriceHistory>> {
        let body: GroupedHistoryBody = self.get(self.all_cryptos_url(window)).await?;
        body.into_domain(&self.server_offset)
    }

    pub async fn compare(&self, ids: &[SeriesId], hours: HourRange) -> NetworkResult<Vec<PriceHistory>> {
        let body: GroupedHistoryBody = self.get(self.compare_url(ids, hours)).await?;
        body.into_domain(&self.server_offset)
    }

    pub async fn regression(&self, id: SeriesId, hours: HourRange) -> NetworkResult<RemoteRegression> {
        let body: RegressionBody = self.get(self.regression_url(id, hours)).await?;
        body.into_domain(id, &self.server_offset)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> NetworkResult<T> {
        log_debug!(LogComponent::Infrastructure("PriceApi"), "📡 GET {url}");

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| NetworkError::HttpRequestFailed(e.to_string()))?;

        let text = response.text().await.map_err(|e| NetworkError::Decode(e.to_string()))?;

        if !response.ok() {
            get_logger().log(
                LogEntry::new(LogLevel::Warn, LogComponent::Infrastructure("PriceApi"), "❌ HTTP error")
                    .field("url", &url)
                    .field("status", response.status()),
            );
            // Error bodies still carry the service's message when present.
            return match decode_envelope::<serde::de::IgnoredAny>(&text) {
                Err(status @ NetworkError::ServiceStatus { .. }) => Err(status),
                _ => Err(NetworkError::HttpStatus {
                    status: response.status(),
                    status_text: response.status_text(),
                }),
            };
        }

        decode_envelope(&text).inspect_err(|e| {
            log_warn!(LogComponent::Infrastructure("PriceApi"), "❌ {url}: {e}");
        })
    }
}

impl PriceRepository for PriceApiClient {
    async fn list_assets(&self) -> Result<Vec<CryptoAsset>, NetworkError> {
        PriceApiClient::list_assets(self).await
    }

    async fn price_history(&self, id: SeriesId, window: ViewWindow) -> Result<PriceHistory, NetworkError> {
        PriceApiClient::price_history(self, id, window).await
    }
}
