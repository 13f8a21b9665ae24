use std::path::{Path, PathBuf};

use async_trait::async_trait;
use candela_core::{Candle, CandelaError, CandleStore, Timeframe};

/// Flat-file store: one pretty-printed JSON array of candles per
/// `(symbol, timeframe)`, named `{symbol}_{timeframe}.json` with `/` in
/// the symbol replaced by `_`.
///
/// Every save rewrites the file whole through a sibling temp file and a
/// rename, so readers never observe a truncated series.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    /// Returns `Storage` when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CandelaError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the series file for a key.
    #[must_use]
    pub fn series_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        let sanitized = symbol.replace('/', "_");
        self.dir
            .join(format!("{sanitized}_{}.json", timeframe.code()))
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CandelaError> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[async_trait]
impl CandleStore for JsonFileStore {
    async fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<Vec<Candle>>, CandelaError> {
        let path = self.series_path(symbol, timeframe);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let candles: Vec<Candle> = serde_json::from_str(&raw)?;
        Ok(Some(candles))
    }

    async fn save(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(), CandelaError> {
        let path = self.series_path(symbol, timeframe);
        let bytes = serde_json::to_vec_pretty(candles)?;
        Self::write_atomic(&path, &bytes)
    }
}
