use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use candela_core::{CandelaError, ExchangeConnector, Timeframe};

use crate::registry::ProviderRegistry;

/// Tunables for the backfill engine.
///
/// Defaults are conservative and mirror typical public-API etiquette:
/// 20s per provider call, 1s fixed pauses, 1000-row pages.
#[derive(Debug, Clone)]
pub struct CandelaConfig {
    /// Upper bound for a single provider call. A call exceeding this is
    /// classified as a network failure for that attempt.
    pub provider_timeout: Duration,
    /// Fixed pause between consecutive provider attempts within one walk.
    pub attempt_pause: Duration,
    /// Fixed pause between consecutive holes within one backfill run.
    pub range_pause: Duration,
    /// Fixed pause between timeframes in [`Candela::backfill_all`].
    pub timeframe_pause: Duration,
    /// Maximum candles requested in a single provider call.
    pub page_limit: usize,
    /// When false, a fallback walk stops after the first failed provider
    /// instead of continuing down the ranking.
    pub allow_fallback: bool,
    /// When false, the persisted ranking is ignored on reads and the
    /// registration order is always used.
    pub dynamic_ranking: bool,
    /// Timeframes processed by [`Candela::backfill_all`].
    pub timeframes: Vec<Timeframe>,
}

impl Default for CandelaConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(20),
            attempt_pause: Duration::from_secs(1),
            range_pause: Duration::from_secs(1),
            timeframe_pause: Duration::from_secs(2),
            page_limit: 1000,
            allow_fallback: true,
            dynamic_ranking: true,
            timeframes: Timeframe::ALL.to_vec(),
        }
    }
}

/// The backfill engine: gap detection, ranked provider fallback, and
/// merge-and-persist, behind one handle.
///
/// Connector identifiers are resolved once at build time into a fixed
/// table; a persisted ranking entry naming an unregistered connector is
/// classified as `provider_unavailable` during a walk rather than being
/// silently skipped.
pub struct Candela {
    pub(crate) connectors: HashMap<&'static str, Arc<dyn ExchangeConnector>>,
    pub(crate) registry: ProviderRegistry,
    pub(crate) store: Arc<dyn candela_core::CandleStore>,
    pub(crate) cfg: CandelaConfig,
}

/// Builder for constructing a [`Candela`] engine.
pub struct CandelaBuilder {
    connectors: Vec<Arc<dyn ExchangeConnector>>,
    store: Option<Arc<dyn candela_core::CandleStore>>,
    ranking_cache: Option<PathBuf>,
    cfg: CandelaConfig,
}

impl Default for CandelaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandelaBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            store: None,
            ranking_cache: None,
            cfg: CandelaConfig::default(),
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order doubles as the default provider ordering used
    /// until a key has accumulated its own success ranking; register the
    /// most reliable sources first.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn ExchangeConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set the candle store the engine persists through. Required.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn candela_core::CandleStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Persist provider rankings to the given file, loaded once at build
    /// time and rewritten (atomically) after every successful fetch.
    ///
    /// Without a cache path the ranking lives in memory only and resets
    /// with the process.
    #[must_use]
    pub fn ranking_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.ranking_cache = Some(path.into());
        self
    }

    /// Upper bound for a single provider call.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Fixed pause between provider attempts within one fallback walk.
    ///
    /// A deliberate simplicity/rate-limit tradeoff: pacing is a fixed
    /// sleep, not adaptive backoff. Set to zero in tests.
    #[must_use]
    pub const fn attempt_pause(mut self, pause: Duration) -> Self {
        self.cfg.attempt_pause = pause;
        self
    }

    /// Fixed pause between holes within one backfill run.
    #[must_use]
    pub const fn range_pause(mut self, pause: Duration) -> Self {
        self.cfg.range_pause = pause;
        self
    }

    /// Fixed pause between timeframes in [`Candela::backfill_all`].
    #[must_use]
    pub const fn timeframe_pause(mut self, pause: Duration) -> Self {
        self.cfg.timeframe_pause = pause;
        self
    }

    /// Maximum candles requested in a single provider call.
    ///
    /// Holes needing more rows than this are fetched with a single capped
    /// request; very long outages therefore close over successive runs
    /// rather than in one pass.
    #[must_use]
    pub const fn page_limit(mut self, limit: usize) -> Self {
        self.cfg.page_limit = limit;
        self
    }

    /// Whether a fallback walk continues past the first failed provider.
    #[must_use]
    pub const fn allow_fallback(mut self, yes: bool) -> Self {
        self.cfg.allow_fallback = yes;
        self
    }

    /// Whether reads consult the persisted success ranking. Promotions
    /// are recorded either way; the toggle only affects read-side order.
    #[must_use]
    pub const fn dynamic_ranking(mut self, yes: bool) -> Self {
        self.cfg.dynamic_ranking = yes;
        self
    }

    /// Timeframes processed by [`Candela::backfill_all`].
    #[must_use]
    pub fn timeframes(mut self, timeframes: Vec<Timeframe>) -> Self {
        self.cfg.timeframes = timeframes;
        self
    }

    /// Build the engine, resolving connector names into a fixed table and
    /// loading the persisted ranking cache if one was configured.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no store was set or two connectors share
    /// a name, and `Storage` when the ranking cache file exists but cannot
    /// be read.
    pub fn build(self) -> Result<Candela, CandelaError> {
        let store = self
            .store
            .ok_or_else(|| CandelaError::InvalidArg("a candle store is required".into()))?;

        let mut table: HashMap<&'static str, Arc<dyn ExchangeConnector>> = HashMap::new();
        let mut default_order = Vec::with_capacity(self.connectors.len());
        for c in self.connectors {
            let name = c.name();
            if table.insert(name, c).is_some() {
                return Err(CandelaError::InvalidArg(format!(
                    "duplicate connector name: {name}"
                )));
            }
            default_order.push(name.to_string());
        }

        let registry = match self.ranking_cache {
            Some(path) => ProviderRegistry::load(path, default_order, self.cfg.dynamic_ranking)?,
            None => ProviderRegistry::in_memory(default_order, self.cfg.dynamic_ranking),
        };

        Ok(Candela {
            connectors: table,
            registry,
            store,
            cfg: self.cfg,
        })
    }
}

impl Candela {
    /// Start building a new `Candela` engine.
    #[must_use]
    pub fn builder() -> CandelaBuilder {
        CandelaBuilder::new()
    }

    /// Current provider ordering for a key: the persisted success ranking
    /// (when dynamic ranking is enabled) merged ahead of the remaining
    /// registration-order defaults.
    #[must_use]
    pub fn ranked_providers(&self, symbol: &str, timeframe: Timeframe) -> Vec<String> {
        self.registry.ranked_providers(symbol, timeframe)
    }

    /// The ranking registry owned by this engine.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        provider: &str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, CandelaError>
    where
        Fut: core::future::Future<Output = Result<T, CandelaError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(CandelaError::network(provider, "request timed out")))
    }
}
