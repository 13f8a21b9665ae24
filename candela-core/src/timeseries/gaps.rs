use chrono::{DateTime, Duration, Utc};

use crate::types::{Candle, TimeRange};

/// Compute the ordered sub-ranges of `range` not covered by `series` at the
/// given candle spacing.
///
/// - An empty series yields the whole `range`.
/// - A leading gap is emitted when the first stored timestamp is later
///   than `range.start`.
/// - An interior gap is emitted between consecutive stored timestamps
///   whose distance reaches two full intervals; the tolerance of one
///   interval absorbs normal provider jitter. The gap spans
///   `[previous + interval, next)`.
/// - A trailing gap is emitted when the last stored timestamp sits more
///   than one interval before `range.end`.
///
/// Every emitted range is clipped to `range`, so the output is
/// chronological, non-overlapping, and contained in the requested window.
/// Pure function of its inputs: no I/O, no randomness. Input order does
/// not matter; duplicate timestamps are ignored.
#[must_use]
pub fn missing_ranges(series: &[Candle], range: TimeRange, interval: Duration) -> Vec<TimeRange> {
    let mut stamps: Vec<DateTime<Utc>> = series.iter().map(|c| c.ts).collect();
    stamps.sort_unstable();
    stamps.dedup();

    if stamps.is_empty() {
        return vec![range];
    }

    let mut missing = Vec::new();
    let mut push_clipped = |start: DateTime<Utc>, end: DateTime<Utc>| {
        if start < end
            && let Some(clipped) = (TimeRange { start, end }).clip(&range)
        {
            missing.push(clipped);
        }
    };

    let first = stamps[0];
    if first > range.start {
        push_clipped(range.start, first);
    }

    for pair in stamps.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next - prev >= interval + interval {
            push_clipped(prev + interval, next);
        }
    }

    let last = stamps[stamps.len() - 1];
    if last + interval < range.end {
        push_clipped(last + interval, range.end);
    }

    missing
}
