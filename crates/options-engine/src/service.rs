//! Chain lookups with result caching.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use metrics::counter;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::TtlCache;
use crate::chain::{load_chain, ChainSettings, OptionsChain};
use crate::source::ChainSource;
use crate::telemetry;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct ChainResponse {
    pub cached: bool,
    pub data: OptionsChain,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub cached_symbols: Vec<String>,
    pub cache_count: usize,
    pub cache_duration_hours: f64,
}

/// Serves normalized chains from a source, caching them per symbol
pub struct ChainService {
    source: Arc<dyn ChainSource>,
    settings: ChainSettings,
    cache: Option<RwLock<TtlCache<String, OptionsChain>>>,
}

impl ChainService {
    pub fn new(source: Arc<dyn ChainSource>, settings: ChainSettings, cache_ttl: Duration) -> Self {
        Self {
            source,
            settings,
            cache: Some(RwLock::new(TtlCache::new(cache_ttl))),
        }
    }

    pub fn without_cache(source: Arc<dyn ChainSource>, settings: ChainSettings) -> Self {
        Self {
            source,
            settings,
            cache: None,
        }
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub async fn get_chain(&self, symbol: &str) -> Result<Option<ChainResponse>> {
        self.get_chain_at(symbol, Local::now().naive_local()).await
    }

    pub async fn get_chain_at(&self, symbol: &str, now: NaiveDateTime) -> Result<Option<ChainResponse>> {
        let key = symbol.to_uppercase();

        if let Some(cache) = &self.cache {
            if let Some(chain) = cache.read().await.get(&key) {
                counter!(telemetry::CHAIN_CACHE, "result" => "hit").increment(1);
                info!(symbol = %key, "Returning cached options chain");
                return Ok(Some(ChainResponse {
                    cached: true,
                    data: chain.clone(),
                }));
            }
            counter!(telemetry::CHAIN_CACHE, "result" => "miss").increment(1);
        }

        let Some(chain) = load_chain(self.source.as_ref(), &key, now, &self.settings).await? else {
            return Ok(None);
        };

        if let Some(cache) = &self.cache {
            let mut cache = cache.write().await;
            cache.purge_expired();
            cache.put(key, chain.clone());
        }

        Ok(Some(ChainResponse {
            cached: false,
            data: chain,
        }))
    }

    pub async fn cache_status(&self) -> CacheStatus {
        match &self.cache {
            Some(cache) => {
                let cache = cache.read().await;
                let mut cached_symbols = cache.keys();
                cached_symbols.sort();
                CacheStatus {
                    cache_count: cached_symbols.len(),
                    cached_symbols,
                    cache_duration_hours: cache.ttl().as_secs_f64() / 3600.0,
                }
            }
            None => CacheStatus {
                cached_symbols: Vec::new(),
                cache_count: 0,
                cache_duration_hours: 0.0,
            },
        }
    }

    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.clear();
            info!("Options chain cache cleared");
        }
    }
}
