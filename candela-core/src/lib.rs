//! candela-core
//!
//! Core types, traits, and utilities shared across the candela workspace.
//!
//! - `types`: candles, timeframes, and half-open time ranges.
//! - `error`: the unified `CandelaError` taxonomy for provider attempts.
//! - `report`: per-attempt classification and the aggregate failure report.
//! - `connector`: the `ExchangeConnector` trait and the OHLCV role trait.
//! - `store`: the persistence contract for candle series.
//! - `timeseries`: gap detection and first-wins merging of candle series.
//!
//! This crate performs no I/O itself: gap detection and merging are pure
//! functions, and the connector/store traits are implemented elsewhere.
#![warn(missing_docs)]

/// Connector capability traits and the primary `ExchangeConnector` interface.
pub mod connector;
pub mod error;
pub mod report;
/// Persistence contract for candle series.
pub mod store;
/// Time-series utilities for gap detection and merging.
pub mod timeseries;
pub mod types;

pub use connector::{ExchangeConnector, OhlcvProvider};
pub use error::CandelaError;
pub use report::{AttemptOutcome, FailureReport, FetchAttempt};
pub use store::CandleStore;
pub use timeseries::gaps::missing_ranges;
pub use timeseries::merge::merge_candles;
pub use types::{Candle, TimeRange, Timeframe};
