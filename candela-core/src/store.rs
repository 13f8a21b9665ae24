use async_trait::async_trait;

use crate::{Candle, CandelaError, Timeframe};

/// Persistence contract for candle series.
///
/// The backfill driver is agnostic about the backing medium (flat files,
/// relational tables); it only requires that `save` followed by `load`
/// round-trips the same candles, sorted ascending by timestamp.
///
/// The series for a key is owned by the store between calls: the driver
/// loads a snapshot, merges into a working copy, and hands back the full
/// updated series to `save`. There is no partial-update operation.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Load the stored series for `(symbol, timeframe)`, or `None` when
    /// nothing has been persisted yet.
    async fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<Vec<Candle>>, CandelaError>;

    /// Replace the stored series for `(symbol, timeframe)` with `candles`.
    async fn save(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(), CandelaError>;
}
