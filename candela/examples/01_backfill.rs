use std::sync::Arc;
use std::time::Duration;

use candela::{Candela, JsonFileStore};
use candela_core::{TimeRange, Timeframe};
use candela_mock::{MockExchange, ScriptedResponse, candles, epoch};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candela=info".into()),
        )
        .init();

    // 1. A scripted connector stands in for a real exchange here.
    let hour = Duration::from_secs(3600);
    let exchange = Arc::new(MockExchange::new(
        "demo-exchange",
        vec![ScriptedResponse::Rows(candles(epoch(), hour, 0, 48))],
    ));

    // 2. Build the engine over a flat-file store; rankings persist too.
    let store = Arc::new(JsonFileStore::new("demo-data")?);
    let engine = Candela::builder()
        .with_connector(exchange)
        .store(store)
        .ranking_cache("demo-data/success_providers.json")
        .build()?;

    // 3. Backfill two days of hourly candles. Only the missing spans are
    //    fetched; re-running this program fetches nothing.
    let range = TimeRange::new(epoch(), epoch() + chrono::Duration::hours(48))?;
    let result = engine.backfill("BTC/USDT", Timeframe::H1, range).await?;

    println!(
        "filled {}/{} missing ranges",
        result.filled_count(),
        result.ranges.len()
    );
    for status in &result.ranges {
        match (&status.provider, &status.error) {
            (Some(p), _) => println!("  {} <- {p}", status.range),
            (None, Some(e)) => println!("  {} unfilled: {e}", status.range),
            (None, None) => {}
        }
    }
    Ok(())
}
