//! Time-series utilities shared by the backfill driver and tests.
//!
//! Modules include:
//! - `gaps`: compute the missing sub-ranges of a desired window
//! - `merge`: first-wins merging of candle series by timestamp
/// Gap detection over stored candle series.
pub mod gaps;
/// Merge utilities for joining candle series.
pub mod merge;
