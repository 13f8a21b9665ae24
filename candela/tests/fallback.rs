use std::sync::Arc;
use std::time::Duration;

use candela::Candela;
use candela_core::{AttemptOutcome, CandelaError, Timeframe};
use candela_mock::{MemoryStore, MockExchange, ScriptedResponse, candles, epoch};

fn engine(connectors: Vec<Arc<MockExchange>>) -> Candela {
    let mut builder = Candela::builder()
        .store(Arc::new(MemoryStore::new()))
        .attempt_pause(Duration::ZERO)
        .range_pause(Duration::ZERO);
    for c in connectors {
        builder = builder.with_connector(c);
    }
    builder.build().expect("engine builds")
}

fn hour() -> Duration {
    Duration::from_secs(3600)
}

#[tokio::test]
async fn walk_stops_at_first_success_and_promotes_it() {
    let x = Arc::new(MockExchange::new("x", vec![ScriptedResponse::NetworkError]));
    let y = Arc::new(MockExchange::unsupported("y"));
    let z = Arc::new(MockExchange::new(
        "z",
        vec![ScriptedResponse::Rows(candles(epoch(), hour(), 0, 5))],
    ));
    let w = Arc::new(MockExchange::new(
        "w",
        vec![ScriptedResponse::Rows(candles(epoch(), hour(), 0, 5))],
    ));
    let engine = engine(vec![x.clone(), y.clone(), z.clone(), w.clone()]);

    let (rows, provider) = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 5)
        .await
        .expect("third provider answers");

    assert_eq!(provider, "z");
    assert_eq!(rows.len(), 5);
    // Providers ranked after the winner are never contacted.
    assert_eq!(w.calls(), 0);
    assert_eq!(
        engine.ranked_providers("BTC/USDT", Timeframe::H1),
        vec!["z", "x", "y", "w"]
    );
}

#[tokio::test]
async fn exhausted_walk_reports_every_attempt_in_order() {
    let a = Arc::new(MockExchange::new("a", vec![ScriptedResponse::NetworkError]));
    let b = Arc::new(MockExchange::new("b", vec![ScriptedResponse::Empty]));
    let c = Arc::new(MockExchange::new("c", vec![ScriptedResponse::ExchangeError]));
    let engine = engine(vec![a, b, c]);

    let err = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 5)
        .await
        .expect_err("all providers fail");

    let CandelaError::AllProvidersFailed(report) = err else {
        panic!("expected aggregated failure, got {err}");
    };
    let attempts = report.attempts();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].provider, "a");
    assert_eq!(attempts[0].outcome, AttemptOutcome::NetworkError);
    assert_eq!(attempts[1].provider, "b");
    assert_eq!(attempts[1].outcome, AttemptOutcome::EmptyResult);
    assert_eq!(attempts[2].provider, "c");
    assert_eq!(attempts[2].outcome, AttemptOutcome::ExchangeError);
}

#[tokio::test]
async fn fallback_disabled_stops_after_first_failure() {
    let a = Arc::new(MockExchange::new("a", vec![ScriptedResponse::NetworkError]));
    let b = Arc::new(MockExchange::new(
        "b",
        vec![ScriptedResponse::Rows(candles(epoch(), hour(), 0, 3))],
    ));
    let mut engine = Candela::builder()
        .store(Arc::new(MemoryStore::new()))
        .attempt_pause(Duration::ZERO)
        .allow_fallback(false);
    for c in [a, b.clone()] {
        engine = engine.with_connector(c);
    }
    let engine = engine.build().expect("engine builds");

    let err = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 3)
        .await
        .expect_err("walk stops at first failure");
    let CandelaError::AllProvidersFailed(report) = err else {
        panic!("expected aggregated failure, got {err}");
    };
    assert_eq!(report.len(), 1);
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn no_registered_providers_yields_empty_report() {
    let engine = engine(vec![]);
    let err = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 5)
        .await
        .expect_err("nothing to try");
    let CandelaError::AllProvidersFailed(report) = err else {
        panic!("expected aggregated failure, got {err}");
    };
    assert!(report.is_empty());
}

#[tokio::test]
async fn slow_provider_classifies_as_network_error() {
    let slow = Arc::new(
        MockExchange::new(
            "slow",
            vec![ScriptedResponse::Rows(candles(epoch(), hour(), 0, 3))],
        )
        .with_delay(Duration::from_millis(200)),
    );
    let engine = Candela::builder()
        .store(Arc::new(MemoryStore::new()))
        .with_connector(slow)
        .attempt_pause(Duration::ZERO)
        .provider_timeout(Duration::from_millis(20))
        .build()
        .expect("engine builds");

    let err = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 3)
        .await
        .expect_err("call times out");
    let CandelaError::AllProvidersFailed(report) = err else {
        panic!("expected aggregated failure, got {err}");
    };
    assert_eq!(report.attempts()[0].outcome, AttemptOutcome::NetworkError);
}

#[tokio::test]
async fn non_finite_rows_classify_as_unknown_error() {
    let mut rows = candles(epoch(), hour(), 0, 3);
    rows[1].close = f64::NAN;
    let bad = Arc::new(MockExchange::new("bad", vec![ScriptedResponse::Rows(rows)]));
    let engine = engine(vec![bad]);

    let err = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 3)
        .await
        .expect_err("malformed rows rejected");
    let CandelaError::AllProvidersFailed(report) = err else {
        panic!("expected aggregated failure, got {err}");
    };
    assert_eq!(report.attempts()[0].outcome, AttemptOutcome::UnknownError);
}
