//! Deterministic test doubles for the candela engine: a connector that
//! replays a script of responses and an in-memory candle store.
#![warn(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use candela_core::{
    Candle, CandelaError, CandleStore, ExchangeConnector, OhlcvProvider, Timeframe,
};

/// One scripted reply for a [`MockExchange`] fetch call.
pub enum ScriptedResponse {
    /// Return these candles.
    Rows(Vec<Candle>),
    /// Return an empty result set.
    Empty,
    /// Fail with a network error.
    NetworkError,
    /// Fail with an exchange-reported error.
    ExchangeError,
    /// Fail as unavailable.
    Unavailable,
}

/// Connector that replays a fixed script of responses, recording every
/// request it receives.
///
/// When the script runs out, further calls return empty row sets so a
/// misconfigured test fails on classification rather than panicking.
pub struct MockExchange {
    name: &'static str,
    supported: bool,
    delay: Duration,
    script: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<(DateTime<Utc>, usize)>>,
    calls: AtomicUsize,
}

impl MockExchange {
    /// Connector with the given name and script, answering every key.
    #[must_use]
    pub fn new(name: &'static str, script: Vec<ScriptedResponse>) -> Self {
        Self {
            name,
            supported: true,
            delay: Duration::ZERO,
            script: Mutex::new(script.into()),
            requests: Mutex::new(vec![]),
            calls: AtomicUsize::new(0),
        }
    }

    /// Connector whose `supports_ohlcv` always answers `false`.
    #[must_use]
    pub fn unsupported(name: &'static str) -> Self {
        Self {
            supported: false,
            ..Self::new(name, vec![])
        }
    }

    /// Sleep this long inside every fetch, for exercising call timeouts.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of fetch calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(since, limit)` of every fetch call received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(DateTime<Utc>, usize)> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ExchangeConnector for MockExchange {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "mock"
    }

    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        Some(self as &dyn OhlcvProvider)
    }
}

#[async_trait]
impl OhlcvProvider for MockExchange {
    fn supports_ohlcv(&self, _symbol: &str, _timeframe: Timeframe) -> bool {
        self.supported
    }

    async fn fetch_ohlcv(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>, CandelaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((since, limit));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(ScriptedResponse::Rows(rows)) => Ok(rows),
            Some(ScriptedResponse::Empty) | None => Ok(vec![]),
            Some(ScriptedResponse::NetworkError) => {
                Err(CandelaError::network(self.name, "connection reset"))
            }
            Some(ScriptedResponse::ExchangeError) => {
                Err(CandelaError::exchange(self.name, "rate limit exceeded"))
            }
            Some(ScriptedResponse::Unavailable) => {
                Err(CandelaError::provider_unavailable(self.name, "maintenance"))
            }
        }
    }
}

/// In-memory [`CandleStore`] keyed by `(symbol, timeframe)`, with a save
/// counter for asserting persistence behavior.
#[derive(Default)]
pub struct MemoryStore {
    series: Mutex<HashMap<(String, String), Vec<Candle>>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls received so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current stored series for a key, if any.
    #[must_use]
    pub fn snapshot(&self, symbol: &str, timeframe: Timeframe) -> Option<Vec<Candle>> {
        self.series
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(symbol.to_string(), timeframe.code().to_string()))
            .cloned()
    }
}

#[async_trait]
impl CandleStore for MemoryStore {
    async fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<Vec<Candle>>, CandelaError> {
        Ok(self.snapshot(symbol, timeframe))
    }

    async fn save(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(), CandelaError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.series
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                (symbol.to_string(), timeframe.code().to_string()),
                candles.to_vec(),
            );
        Ok(())
    }
}

/// A flat candle at `base + slot * interval` whose price encodes the slot,
/// so tests can tell rows apart and spot first-seen-wins outcomes.
#[must_use]
pub fn candle_at(base: DateTime<Utc>, interval: Duration, slot: u32) -> Candle {
    let step = chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());
    let ts = base + step * i32::try_from(slot).unwrap_or(i32::MAX);
    let price = 100.0 + f64::from(slot);
    Candle {
        ts,
        open: price,
        high: price,
        low: price,
        close: price,
        volume: 1.0,
    }
}

/// Consecutive [`candle_at`] rows for slots `start..start + count`.
#[must_use]
pub fn candles(base: DateTime<Utc>, interval: Duration, start: u32, count: u32) -> Vec<Candle> {
    (start..start + count)
        .map(|slot| candle_at(base, interval, slot))
        .collect()
}

/// Midnight 2024-01-01 UTC, a convenient fixture origin.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default()
}
