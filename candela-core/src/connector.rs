use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Candle, CandelaError, Timeframe};

/// Focused role trait for connectors that can serve OHLCV candles.
#[async_trait]
pub trait OhlcvProvider: Send + Sync {
    /// Whether this provider *claims* to serve OHLCV for the given market.
    ///
    /// A `false` here is classified as `provider_unavailable` by the
    /// orchestrator; providers that cannot answer cheaply may return `true`
    /// and reject in [`fetch_ohlcv`](Self::fetch_ohlcv) instead.
    fn supports_ohlcv(&self, symbol: &str, timeframe: Timeframe) -> bool;

    /// Fetch up to `limit` candles starting at `since`.
    ///
    /// Implementations must surface failures as classifiable
    /// [`CandelaError`] variants (network, exchange-level, unavailable)
    /// rather than silently returning malformed rows. An `Ok` with zero
    /// rows is treated as a failed attempt by the orchestrator.
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>, CandelaError>;
}

/// Main connector trait implemented by provider crates. Exposes capability
/// discovery; the orchestrator only talks to providers through the role
/// trait returned by the accessor.
pub trait ExchangeConnector: Send + Sync {
    /// A stable identifier used in rankings and the persisted cache
    /// (e.g. "kraken", "binance"). Must be unique within one orchestrator.
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise OHLCV capability by returning a usable trait object
    /// reference when supported.
    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        None
    }
}
