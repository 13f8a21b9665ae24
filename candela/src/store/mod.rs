//! Bundled [`candela_core::CandleStore`] implementations.

pub mod json;
