use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::CandelaError;
use crate::types::Candle;

/// Merge multiple candle series in priority order (first is highest).
///
/// - Candles are keyed by `ts`; the first appearance wins for duplicates.
/// - Candles are returned sorted ascending by timestamp.
/// - Finiteness is a required invariant for the merged output: pass the
///   already-stored series first so that a provider echoing a known
///   timestamp never overwrites persisted data.
///
/// # Errors
/// Returns `Err(CandelaError::Data)` if any contributing candle carries a
/// non-finite numeric field.
pub fn merge_candles<I>(series: I) -> Result<Vec<Candle>, CandelaError>
where
    I: IntoIterator<Item = Vec<Candle>>,
{
    let mut map: BTreeMap<DateTime<Utc>, Candle> = BTreeMap::new();
    for s in series {
        for c in s {
            if !c.is_finite() {
                return Err(CandelaError::Data(format!(
                    "non-finite candle at {}: open={} high={} low={} close={} volume={}",
                    c.ts, c.open, c.high, c.low, c.close, c.volume
                )));
            }
            map.entry(c.ts).or_insert(c);
        }
    }
    Ok(map.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(sec: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(sec, 0).unwrap()
    }

    fn candle(sec: i64, close: f64) -> Candle {
        Candle {
            ts: t(sec),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn overlapping_batches_dedup_to_first_seen() {
        let existing: Vec<Candle> = (0..10).map(|i| candle(i * 60, 100.0)).collect();
        let incoming: Vec<Candle> = (8..13).map(|i| candle(i * 60, 200.0)).collect();
        let merged = merge_candles([existing, incoming]).unwrap();

        // 10 existing + 5 incoming with 2 overlaps = 13 unique timestamps.
        assert_eq!(merged.len(), 13);
        assert!(merged.windows(2).all(|w| w[0].ts < w[1].ts));
        // First-seen wins: the stored values survive at overlapping stamps.
        assert!((merged[8].close - 100.0).abs() < f64::EPSILON);
        assert!((merged[9].close - 100.0).abs() < f64::EPSILON);
        assert!((merged[10].close - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let bad = vec![Candle {
            volume: f64::INFINITY,
            ..candle(0, 1.0)
        }];
        assert!(matches!(
            merge_candles([bad]),
            Err(CandelaError::Data(_))
        ));
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge_candles(Vec::<Vec<Candle>>::new()).unwrap().is_empty());
    }
}
