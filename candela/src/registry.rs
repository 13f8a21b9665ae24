use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use candela_core::{CandelaError, Timeframe};

/// Persisted shape: `symbol -> timeframe code -> provider ids`, most
/// recently successful first.
type RankingDoc = HashMap<String, HashMap<String, Vec<String>>>;

/// Per-(symbol, timeframe) provider rankings, promoted by observed success
/// and persisted across runs as a single JSON document.
///
/// The document is loaded fully into memory once and rewritten whole
/// (write-to-temp, then rename) after every promotion. Writes are
/// serialized behind an in-process mutex; concurrent *processes* sharing
/// one cache file race last-writer-wins, a documented limitation.
pub struct ProviderRegistry {
    cache_path: Option<PathBuf>,
    default_order: Vec<String>,
    dynamic: bool,
    rankings: Mutex<RankingDoc>,
}

impl ProviderRegistry {
    /// Registry without persistence; rankings reset with the process.
    #[must_use]
    pub fn in_memory(default_order: Vec<String>, dynamic: bool) -> Self {
        Self {
            cache_path: None,
            default_order,
            dynamic,
            rankings: Mutex::new(HashMap::new()),
        }
    }

    /// Load the persisted ranking document, starting empty when the file
    /// does not exist yet. A file that exists but fails to parse is
    /// logged and discarded rather than aborting startup; the rankings
    /// rebuild from scratch as fetches succeed.
    ///
    /// # Errors
    /// Returns `Storage` when the file exists but cannot be read.
    pub fn load(
        path: PathBuf,
        default_order: Vec<String>,
        dynamic: bool,
    ) -> Result<Self, CandelaError> {
        let doc = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<RankingDoc>(&raw) {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "discarding unparseable ranking cache"
                    );
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            cache_path: Some(path),
            default_order,
            dynamic,
            rankings: Mutex::new(doc),
        })
    }

    /// Ordered provider preference for a key.
    ///
    /// Persisted ids are returned first (filtered to currently registered
    /// providers, so stale cache entries drop out), followed by the
    /// remaining defaults in registration order. With dynamic ranking
    /// disabled, the registration order is returned unchanged.
    #[must_use]
    pub fn ranked_providers(&self, symbol: &str, timeframe: Timeframe) -> Vec<String> {
        if !self.dynamic {
            return self.default_order.clone();
        }

        let rankings = self.rankings.lock().unwrap_or_else(|e| e.into_inner());
        let promoted = rankings
            .get(symbol)
            .and_then(|per_tf| per_tf.get(timeframe.code()));

        let mut result = Vec::with_capacity(self.default_order.len());
        if let Some(promoted) = promoted {
            for id in promoted {
                if self.default_order.contains(id) {
                    result.push(id.clone());
                }
            }
        }
        for id in &self.default_order {
            if !result.contains(id) {
                result.push(id.clone());
            }
        }
        result
    }

    /// Move `provider` to the front of the ranking for this key and
    /// persist the whole updated document.
    ///
    /// The entry is created lazily on the first success for a key; the
    /// resulting list never contains duplicate ids.
    ///
    /// # Errors
    /// Returns `Storage` when the cache file cannot be rewritten.
    pub fn record_success(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        provider: &str,
    ) -> Result<(), CandelaError> {
        let mut rankings = self.rankings.lock().unwrap_or_else(|e| e.into_inner());
        let ranked = rankings
            .entry(symbol.to_string())
            .or_default()
            .entry(timeframe.code().to_string())
            .or_default();
        ranked.retain(|id| id != provider);
        ranked.insert(0, provider.to_string());
        tracing::debug!(provider, symbol, timeframe = %timeframe, "promoted provider");
        self.persist(&rankings)
    }

    fn persist(&self, doc: &RankingDoc) -> Result<(), CandelaError> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        // Whole-document rewrite through a sibling temp file so a crash
        // mid-write can never leave a truncated cache behind.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        vec!["binance".into(), "kraken".into(), "okx".into()]
    }

    #[test]
    fn unknown_key_falls_back_to_registration_order() {
        let reg = ProviderRegistry::in_memory(defaults(), true);
        assert_eq!(reg.ranked_providers("BTC/USDT", Timeframe::H1), defaults());
    }

    #[test]
    fn promotion_moves_to_front_without_duplicates() {
        let reg = ProviderRegistry::in_memory(defaults(), true);
        reg.record_success("BTC/USDT", Timeframe::H1, "okx").unwrap();
        assert_eq!(
            reg.ranked_providers("BTC/USDT", Timeframe::H1),
            vec!["okx", "binance", "kraken"]
        );

        reg.record_success("BTC/USDT", Timeframe::H1, "kraken").unwrap();
        reg.record_success("BTC/USDT", Timeframe::H1, "okx").unwrap();
        let ranked = reg.ranked_providers("BTC/USDT", Timeframe::H1);
        assert_eq!(ranked, vec!["okx", "kraken", "binance"]);
    }

    #[test]
    fn rankings_are_scoped_per_key() {
        let reg = ProviderRegistry::in_memory(defaults(), true);
        reg.record_success("BTC/USDT", Timeframe::H1, "okx").unwrap();
        assert_eq!(reg.ranked_providers("BTC/USDT", Timeframe::D1), defaults());
        assert_eq!(reg.ranked_providers("ETH/USDT", Timeframe::H1), defaults());
    }

    #[test]
    fn dynamic_ranking_disabled_ignores_promotions_on_read() {
        let reg = ProviderRegistry::in_memory(defaults(), false);
        reg.record_success("BTC/USDT", Timeframe::H1, "okx").unwrap();
        assert_eq!(reg.ranked_providers("BTC/USDT", Timeframe::H1), defaults());
    }
}
