use candela_core::{Candle, CandelaError, TimeRange, Timeframe, merge_candles, missing_ranges};

use crate::Candela;

/// Outcome of one hole within a backfill run.
#[derive(Debug)]
pub struct RangeStatus {
    /// The missing span this entry covers.
    pub range: TimeRange,
    /// Provider that supplied the rows, when the hole was filled.
    pub provider: Option<String>,
    /// The error that stopped this hole, when it was not filled.
    pub error: Option<CandelaError>,
}

impl RangeStatus {
    /// Whether this hole was filled and persisted.
    #[must_use]
    pub const fn filled(&self) -> bool {
        self.provider.is_some()
    }
}

/// Per-range report for one `(symbol, timeframe)` backfill run.
#[derive(Debug)]
pub struct BackfillResult {
    /// Symbol the run covered.
    pub symbol: String,
    /// Timeframe the run covered.
    pub timeframe: Timeframe,
    /// One entry per detected hole, in chronological order. Empty when the
    /// stored series already covered the requested window.
    pub ranges: Vec<RangeStatus>,
}

impl BackfillResult {
    /// True when the series was already complete or at least one hole was
    /// filled this run.
    #[must_use]
    pub fn success(&self) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(RangeStatus::filled)
    }

    /// True when every detected hole was filled.
    #[must_use]
    pub fn fully_filled(&self) -> bool {
        self.ranges.iter().all(RangeStatus::filled)
    }

    /// Number of holes filled this run.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.filled()).count()
    }
}

impl Candela {
    /// Bring the stored series for `(symbol, timeframe)` up to date over
    /// `range`, fetching only the missing spans.
    ///
    /// Holes are processed oldest-first. Each hole runs an independent
    /// fallback walk; a hole that every provider fails is recorded and
    /// skipped, and the run moves on to the next one. After every filled
    /// hole the merged series is persisted in full, so an interruption
    /// loses at most the hole in flight.
    ///
    /// # Errors
    /// Returns `Storage` when the stored series cannot be loaded. Fetch
    /// and save failures for individual holes are contained in the
    /// returned [`BackfillResult`] instead.
    pub async fn backfill(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: TimeRange,
    ) -> Result<BackfillResult, CandelaError> {
        let mut working = self
            .store
            .load(symbol, timeframe)
            .await?
            .unwrap_or_default();

        let interval = timeframe.duration();
        let holes = missing_ranges(&working, range, interval);
        if holes.is_empty() {
            tracing::debug!(symbol, timeframe = %timeframe, "series already complete");
            return Ok(BackfillResult {
                symbol: symbol.to_string(),
                timeframe,
                ranges: vec![],
            });
        }

        tracing::info!(
            symbol,
            timeframe = %timeframe,
            holes = holes.len(),
            "backfilling missing ranges"
        );

        let total = holes.len();
        let mut ranges = Vec::with_capacity(total);
        for (i, hole) in holes.into_iter().enumerate() {
            let status = match self.fill_hole(&mut working, symbol, timeframe, hole).await {
                Ok(provider) => RangeStatus {
                    range: hole,
                    provider: Some(provider),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(
                        symbol,
                        timeframe = %timeframe,
                        start = %hole.start,
                        end = %hole.end,
                        error = %err,
                        "hole left unfilled"
                    );
                    RangeStatus {
                        range: hole,
                        provider: None,
                        error: Some(err),
                    }
                }
            };
            ranges.push(status);
            if i + 1 < total && !self.cfg.range_pause.is_zero() {
                tokio::time::sleep(self.cfg.range_pause).await;
            }
        }

        Ok(BackfillResult {
            symbol: symbol.to_string(),
            timeframe,
            ranges,
        })
    }

    /// Run [`Candela::backfill`] for `symbol` across every configured
    /// timeframe, pausing between them.
    ///
    /// # Errors
    /// Propagates the first `Storage` load failure; per-hole failures stay
    /// inside the individual [`BackfillResult`]s.
    pub async fn backfill_all(
        &self,
        symbol: &str,
        range: TimeRange,
    ) -> Result<Vec<BackfillResult>, CandelaError> {
        let total = self.cfg.timeframes.len();
        let mut results = Vec::with_capacity(total);
        for (i, timeframe) in self.cfg.timeframes.clone().into_iter().enumerate() {
            results.push(self.backfill(symbol, timeframe, range).await?);
            if i + 1 < total && !self.cfg.timeframe_pause.is_zero() {
                tokio::time::sleep(self.cfg.timeframe_pause).await;
            }
        }
        Ok(results)
    }

    /// Fetch, merge and persist one hole. `working` is updated only after
    /// the merged series has been saved, so a failed save leaves the
    /// in-memory view consistent with the store.
    async fn fill_hole(
        &self,
        working: &mut Vec<Candle>,
        symbol: &str,
        timeframe: Timeframe,
        hole: TimeRange,
    ) -> Result<String, CandelaError> {
        let want = hole
            .expected_candles(timeframe.duration())
            .min(self.cfg.page_limit);
        let (fetched, provider) = self
            .fetch_with_fallback(symbol, timeframe, hole.start, want)
            .await?;

        let merged = merge_candles([working.clone(), fetched])?;
        self.store.save(&merged, symbol, timeframe).await?;
        *working = merged;
        Ok(provider)
    }
}
