//! Candela keeps a locally persisted, gap-free OHLCV candle series per
//! (symbol, timeframe), backfilled from redundant, independently
//! unreliable providers.
//!
//! Overview
//! - Detects which portions of a desired window are not yet stored
//!   ([`candela_core::missing_ranges`]).
//! - Walks a success-promoted provider ranking for each hole, one bounded
//!   attempt per provider, classifying every failure
//!   ([`Candela::fetch_with_fallback`]).
//! - Merges fetched rows into the stored series (first-seen wins, sorted,
//!   duplicate-free) and persists the full snapshot after every filled
//!   hole ([`Candela::backfill`]).
//!
//! Key behaviors and trade-offs
//! - First success wins: the orchestrator never reconciles conflicting
//!   data across providers; it trusts whichever ranked provider answers
//!   first, on the assumption that the ranking reflects recent
//!   reliability for that exact (symbol, timeframe).
//! - Resilience comes from breadth, not depth: each provider gets exactly
//!   one attempt per walk, with a fixed pause between attempts. There is
//!   no same-provider retry and no adaptive backoff.
//! - A failed hole never aborts the remaining holes; per-range outcomes
//!   are surfaced in [`BackfillResult`].
//! - A crash between fetch and persist loses that hole's rows only; the
//!   next run recomputes gaps from what is actually stored and retries.
//!
//! Known limitation: the ranking cache and the series store are rewritten
//! whole. Writes are serialized in-process, but two *processes* working on
//! the same key race last-writer-wins.
//!
//! Building an engine over two connectors and a flat-file store:
//! ```rust,ignore
//! use std::sync::Arc;
//! use candela::{Candela, JsonFileStore};
//!
//! let store = Arc::new(JsonFileStore::new("data")?);
//! let engine = Candela::builder()
//!     .with_connector(Arc::new(kraken))
//!     .with_connector(Arc::new(binance))
//!     .store(store)
//!     .ranking_cache("cache/success_providers.json")
//!     .build()?;
//!
//! let range = candela_core::TimeRange::new(start, end)?;
//! let result = engine.backfill("BTC/USDT", "1h".parse()?, range).await?;
//! println!("filled {}/{} holes", result.filled_count(), result.ranges.len());
//! ```
#![warn(missing_docs)]

mod backfill;
mod core;
mod fetch;
mod registry;
mod store;

pub use backfill::{BackfillResult, RangeStatus};
pub use core::{Candela, CandelaBuilder, CandelaConfig};
pub use registry::ProviderRegistry;
pub use store::json::JsonFileStore;
