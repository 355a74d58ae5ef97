//! Market-data sources for raw options chains.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::coerce::coerce_f64;
use crate::error::EngineError;
use crate::Result;

/// One upstream chain row; every field may be missing or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    #[serde(default)]
    pub strike: Value,
    #[serde(default)]
    pub last_price: Value,
    #[serde(default)]
    pub bid: Value,
    #[serde(default)]
    pub ask: Value,
    #[serde(default)]
    pub volume: Value,
    #[serde(default)]
    pub open_interest: Value,
}

/// Unsorted call/put rows for a single expiration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChainSlice {
    #[serde(default)]
    pub calls: Vec<RawQuote>,
    #[serde(default)]
    pub puts: Vec<RawQuote>,
}

/// Everything the source returned for a symbol
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionsChain {
    pub symbol: String,
    #[serde(default)]
    pub current_price: Value,
    #[serde(default)]
    pub expiration_dates: Vec<String>,
    #[serde(default)]
    pub chains: HashMap<String, RawChainSlice>,
}

#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn spot_price(&self, symbol: &str) -> Result<f64>;

    /// Expiration dates (`YYYY-MM-DD`) in the order the provider lists them
    async fn expirations(&self, symbol: &str) -> Result<Vec<String>>;

    async fn chain(&self, symbol: &str, expiration: &str) -> Result<RawChainSlice>;
}

/// Source backed by pre-fetched chain snapshots, keyed by upper-case symbol
pub struct InMemoryChainSource {
    snapshots: RwLock<HashMap<String, RawOptionsChain>>,
}

impl InMemoryChainSource {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_snapshots(snapshots: impl IntoIterator<Item = RawOptionsChain>) -> Self {
        let snapshots = snapshots
            .into_iter()
            .map(|s| (s.symbol.to_uppercase(), s))
            .collect();
        Self {
            snapshots: RwLock::new(snapshots),
        }
    }

    /// Load a JSON file holding either one snapshot or an array of them
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;

        let snapshots: Vec<RawOptionsChain> = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            other => vec![serde_json::from_value(other)?],
        };

        info!(path = ?path, count = snapshots.len(), "Loaded chain snapshots");
        Ok(Self::with_snapshots(snapshots))
    }

    pub async fn insert(&self, snapshot: RawOptionsChain) {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.symbol.to_uppercase(), snapshot);
    }

    pub async fn symbols(&self) -> Vec<String> {
        let snapshots = self.snapshots.read().await;
        let mut symbols: Vec<String> = snapshots.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    async fn snapshot<T>(&self, symbol: &str, f: impl FnOnce(&RawOptionsChain) -> Result<T>) -> Result<T> {
        let snapshots = self.snapshots.read().await;
        let snapshot = snapshots
            .get(&symbol.to_uppercase())
            .ok_or_else(|| EngineError::InvalidSymbol(symbol.to_string()))?;
        f(snapshot)
    }
}

impl Default for InMemoryChainSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainSource for InMemoryChainSource {
    async fn spot_price(&self, symbol: &str) -> Result<f64> {
        self.snapshot(symbol, |s| Ok(coerce_f64(&s.current_price, 0.0)))
            .await
    }

    async fn expirations(&self, symbol: &str) -> Result<Vec<String>> {
        self.snapshot(symbol, |s| Ok(s.expiration_dates.clone())).await
    }

    async fn chain(&self, symbol: &str, expiration: &str) -> Result<RawChainSlice> {
        debug!(symbol, expiration, "Reading chain slice");
        self.snapshot(symbol, |s| {
            s.chains.get(expiration).cloned().ok_or_else(|| {
                EngineError::DataNotAvailable(format!("{} {}", symbol, expiration))
            })
        })
        .await
    }
}
