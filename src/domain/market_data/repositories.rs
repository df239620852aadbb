use crate::domain::errors::NetworkError;
use crate::domain::market_data::{CryptoAsset, PriceHistory, SeriesId, ViewWindow};

/// Source of price histories for the refresh pipeline.
///
/// Futures are not required to be `Send`; the engine runs on a single thread.
#[allow(async_fn_in_trait)]
pub trait PriceRepository {
    /// Assets available for charting, in service order.
    async fn list_assets(&self) -> Result<Vec<CryptoAsset>, NetworkError>;

    /// Trailing history for one asset.
    async fn price_history(&self, id: SeriesId, window: ViewWindow) -> Result<PriceHistory, NetworkError>;
}
