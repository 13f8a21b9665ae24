use candela::ProviderRegistry;
use candela_core::Timeframe;

fn defaults() -> Vec<String> {
    vec!["binance".into(), "kraken".into(), "okx".into()]
}

#[test]
fn promotions_survive_a_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cache").join("success_providers.json");

    let reg = ProviderRegistry::load(path.clone(), defaults(), true).expect("fresh cache");
    reg.record_success("BTC/USDT", Timeframe::H1, "okx")
        .expect("persists");
    reg.record_success("ETH/USDT", Timeframe::D1, "kraken")
        .expect("persists");
    drop(reg);

    let reloaded = ProviderRegistry::load(path, defaults(), true).expect("reload");
    assert_eq!(
        reloaded.ranked_providers("BTC/USDT", Timeframe::H1),
        vec!["okx", "binance", "kraken"]
    );
    assert_eq!(
        reloaded.ranked_providers("ETH/USDT", Timeframe::D1),
        vec!["kraken", "binance", "okx"]
    );
    // Untouched keys keep the registration order.
    assert_eq!(
        reloaded.ranked_providers("BTC/USDT", Timeframe::D1),
        defaults()
    );
}

#[test]
fn stale_cached_ids_are_filtered_out_of_rankings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("success_providers.json");

    let reg = ProviderRegistry::load(path.clone(), defaults(), true).expect("fresh cache");
    reg.record_success("BTC/USDT", Timeframe::H1, "okx")
        .expect("persists");
    drop(reg);

    // Reload with okx no longer registered.
    let fewer = vec!["binance".to_string(), "kraken".to_string()];
    let reloaded = ProviderRegistry::load(path, fewer.clone(), true).expect("reload");
    assert_eq!(reloaded.ranked_providers("BTC/USDT", Timeframe::H1), fewer);
}

#[test]
fn corrupt_cache_file_is_discarded_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("success_providers.json");
    std::fs::write(&path, b"{ not json").expect("write garbage");

    let reg = ProviderRegistry::load(path.clone(), defaults(), true).expect("load tolerates");
    assert_eq!(reg.ranked_providers("BTC/USDT", Timeframe::H1), defaults());

    // The next promotion rewrites a valid document.
    reg.record_success("BTC/USDT", Timeframe::H1, "kraken")
        .expect("persists");
    let raw = std::fs::read_to_string(&path).expect("cache readable");
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn persisted_writes_leave_no_temp_file_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("success_providers.json");

    let reg = ProviderRegistry::load(path, defaults(), true).expect("fresh cache");
    reg.record_success("BTC/USDT", Timeframe::H1, "okx")
        .expect("persists");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("readable dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec!["success_providers.json"]);
}
