//! Common data structures: candles, timeframes, and time ranges.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::CandelaError;

/// One sampled interval's open/high/low/close prices and traded volume.
///
/// Identity within a series is `ts`: a stored series never contains two
/// candles with the same timestamp. Persisted candles must be finite in
/// every numeric field; see [`Candle::is_finite`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Opening instant of the sampled interval (UTC).
    pub ts: DateTime<Utc>,
    /// Price at the start of the interval.
    pub open: f64,
    /// Highest traded price within the interval.
    pub high: f64,
    /// Lowest traded price within the interval.
    pub low: f64,
    /// Price at the end of the interval.
    pub close: f64,
    /// Volume traded within the interval.
    pub volume: f64,
}

impl Candle {
    /// Whether every numeric field is finite (no NaN or ±Inf).
    ///
    /// Providers occasionally emit sentinel values for halted markets;
    /// such rows must not reach the persisted series.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Sampling interval code defining candle spacing within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    H8,
    H12,
    D1,
}

impl Timeframe {
    /// Every supported timeframe, finest first.
    pub const ALL: &'static [Self] = &[
        Self::M1,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H4,
        Self::H8,
        Self::H12,
        Self::D1,
    ];

    /// The wire/storage code for this timeframe (e.g. `"1h"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::H8 => "8h",
            Self::H12 => "12h",
            Self::D1 => "1d",
        }
    }

    /// Candle spacing in whole minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        match self {
            Self::M1 => 1,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::H8 => 480,
            Self::H12 => 720,
            Self::D1 => 1440,
        }
    }

    /// The fixed duration implied by this timeframe code.
    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

impl core::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for Timeframe {
    type Err = CandelaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tf| tf.code() == s)
            .ok_or_else(|| CandelaError::InvalidArg(format!("unknown timeframe code: {s}")))
    }
}

/// Half-open `[start, end)` interval of instants.
///
/// Invariant: `start < end`. Construct through [`TimeRange::new`] to have the
/// invariant checked; code building ranges from already-ordered instants may
/// use a struct literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted bounds.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CandelaError> {
        if start >= end {
            return Err(CandelaError::InvalidArg(format!(
                "time range start must precede end: [{start}, {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Span covered by the range.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `ts` lies inside the half-open interval.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Number of candles needed to cover this range at the given spacing.
    ///
    /// One extra candle is requested beyond the whole-interval count so that
    /// a range ending mid-interval is still fully covered. Callers cap the
    /// result at their page limit before issuing a request.
    #[must_use]
    pub fn expected_candles(&self, interval: Duration) -> usize {
        let span = self.duration().num_seconds();
        let step = interval.num_seconds().max(1);
        usize::try_from(span / step).unwrap_or(usize::MAX).saturating_add(1)
    }

    /// Intersection with `bounds`, or `None` when the ranges are disjoint.
    #[must_use]
    pub fn clip(&self, bounds: &Self) -> Option<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then_some(Self { start, end })
    }
}

impl core::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(sec: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(sec, 0).unwrap()
    }

    #[test]
    fn timeframe_codes_round_trip() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.code().parse::<Timeframe>().unwrap(), *tf);
        }
    }

    #[test]
    fn timeframe_rejects_unknown_code() {
        assert!(matches!(
            "3h".parse::<Timeframe>(),
            Err(CandelaError::InvalidArg(_))
        ));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(TimeRange::new(t(10), t(10)).is_err());
        assert!(TimeRange::new(t(10), t(5)).is_err());
        assert!(TimeRange::new(t(5), t(10)).is_ok());
    }

    #[test]
    fn expected_candles_covers_partial_intervals() {
        let hour = Duration::hours(1);
        let r = TimeRange::new(t(0), t(10 * 3600)).unwrap();
        assert_eq!(r.expected_candles(hour), 11);
        let partial = TimeRange::new(t(0), t(3 * 3600 + 1800)).unwrap();
        assert_eq!(partial.expected_candles(hour), 4);
    }

    #[test]
    fn clip_intersects_or_rejects() {
        let a = TimeRange::new(t(0), t(100)).unwrap();
        let b = TimeRange::new(t(50), t(200)).unwrap();
        let c = a.clip(&b).unwrap();
        assert_eq!((c.start, c.end), (t(50), t(100)));
        let disjoint = TimeRange::new(t(100), t(150)).unwrap();
        assert!(a.clip(&disjoint).is_none());
    }

    #[test]
    fn candle_finiteness() {
        let mut c = Candle {
            ts: t(0),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        assert!(c.is_finite());
        c.volume = f64::NAN;
        assert!(!c.is_finite());
    }
}
