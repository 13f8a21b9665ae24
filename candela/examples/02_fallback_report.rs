use std::sync::Arc;
use std::time::Duration;

use candela::Candela;
use candela_core::{CandelaError, Timeframe};
use candela_mock::{MemoryStore, MockExchange, ScriptedResponse, candles, epoch};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candela=debug".into()),
        )
        .init();

    let hour = Duration::from_secs(3600);

    // Three providers: the first two fail in different ways, the third
    // answers. A fourth walk with everything failing shows the report.
    let flaky = Arc::new(MockExchange::new(
        "flaky",
        vec![ScriptedResponse::NetworkError, ScriptedResponse::NetworkError],
    ));
    let dark = Arc::new(MockExchange::unsupported("dark"));
    let steady = Arc::new(MockExchange::new(
        "steady",
        vec![ScriptedResponse::Rows(candles(epoch(), hour, 0, 12))],
    ));

    let engine = Candela::builder()
        .with_connector(flaky)
        .with_connector(dark)
        .with_connector(steady)
        .store(Arc::new(MemoryStore::new()))
        .attempt_pause(Duration::from_millis(100))
        .build()?;

    let (rows, provider) = engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 12)
        .await?;
    println!("{provider} served {} rows", rows.len());
    println!(
        "ranking is now {:?}",
        engine.ranked_providers("BTC/USDT", Timeframe::H1)
    );

    // The steady provider's script is exhausted now; every attempt fails
    // and the aggregate error names each one.
    match engine
        .fetch_with_fallback("BTC/USDT", Timeframe::H1, epoch(), 12)
        .await
    {
        Ok(_) => println!("unexpected success"),
        Err(CandelaError::AllProvidersFailed(report)) => {
            println!("walk failed: {report}");
            for attempt in report.attempts() {
                println!("  {}: {} ({})", attempt.provider, attempt.outcome, attempt.detail);
            }
        }
        Err(other) => println!("walk failed: {other}"),
    }
    Ok(())
}
