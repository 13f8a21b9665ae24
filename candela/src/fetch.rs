use chrono::{DateTime, Utc};

use candela_core::{Candle, CandelaError, FailureReport, FetchAttempt, Timeframe};

use crate::Candela;

impl Candela {
    /// Fetch up to `want` candles starting at `since`, walking the ranked
    /// provider list for this key until one answers.
    ///
    /// Each provider gets exactly one bounded attempt; every failure is
    /// classified (`provider_unavailable`, `network_error`,
    /// `exchange_error`, `empty_result`, `unknown_error`) and recorded.
    /// The first provider returning non-empty, finite rows wins: it is
    /// promoted to the front of the ranking and no later provider is
    /// tried. A fixed pause separates consecutive attempts. With fallback
    /// disabled, the walk stops after the first failure.
    ///
    /// # Errors
    /// Returns `AllProvidersFailed` carrying one classified attempt per
    /// provider tried, in order; the report is empty when the ranking
    /// itself was empty.
    pub async fn fetch_with_fallback(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: DateTime<Utc>,
        want: usize,
    ) -> Result<(Vec<Candle>, String), CandelaError> {
        let ranked = self.registry.ranked_providers(symbol, timeframe);
        let mut report = FailureReport::new();
        let total = ranked.len();

        for (i, id) in ranked.into_iter().enumerate() {
            match self.attempt(&id, symbol, timeframe, since, want).await {
                Ok(candles) => {
                    tracing::info!(
                        provider = %id,
                        symbol,
                        timeframe = %timeframe,
                        rows = candles.len(),
                        "fetched ohlcv"
                    );
                    if let Err(err) = self.registry.record_success(symbol, timeframe, &id) {
                        // Data in hand beats a ranking promotion; keep going.
                        tracing::warn!(provider = %id, error = %err, "failed to persist ranking");
                    }
                    return Ok((candles, id));
                }
                Err(err) => {
                    tracing::warn!(
                        provider = %id,
                        symbol,
                        timeframe = %timeframe,
                        error = %err,
                        "provider attempt failed"
                    );
                    report.push(FetchAttempt::from_error(&id, &err));
                }
            }
            if !self.cfg.allow_fallback {
                break;
            }
            if i + 1 < total && !self.cfg.attempt_pause.is_zero() {
                tokio::time::sleep(self.cfg.attempt_pause).await;
            }
        }

        Err(CandelaError::AllProvidersFailed(report))
    }

    /// One bounded attempt against a single ranked provider id.
    async fn attempt(
        &self,
        id: &str,
        symbol: &str,
        timeframe: Timeframe,
        since: DateTime<Utc>,
        want: usize,
    ) -> Result<Vec<Candle>, CandelaError> {
        let Some(connector) = self.connectors.get(id) else {
            return Err(CandelaError::provider_unavailable(
                id,
                "no such connector registered",
            ));
        };
        let Some(provider) = connector.as_ohlcv_provider() else {
            return Err(CandelaError::provider_unavailable(
                id,
                "ohlcv capability not offered",
            ));
        };
        if !provider.supports_ohlcv(symbol, timeframe) {
            return Err(CandelaError::provider_unavailable(
                id,
                format!("{symbol} {timeframe} not served"),
            ));
        }

        let fut = provider.fetch_ohlcv(symbol, timeframe, since, want);
        let candles = Self::provider_call_with_timeout(id, self.cfg.provider_timeout, fut).await?;

        if candles.is_empty() {
            return Err(CandelaError::empty_result(id));
        }
        if candles.iter().any(|c| !c.is_finite()) {
            return Err(CandelaError::unknown(id, "non-finite fields in returned rows"));
        }
        Ok(candles)
    }
}
