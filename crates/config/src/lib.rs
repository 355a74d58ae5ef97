//! Configuration for Optx
//!
//! A single YAML document with one section per concern. Every field has a
//! default, so an empty file (or no file) yields a usable configuration.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OptxConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Volatility reported when none can be implied from a price
    #[serde(default = "default_fallback_volatility")]
    pub fallback_volatility: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            fallback_volatility: default_fallback_volatility(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChainConfig {
    #[serde(default = "default_max_expirations")]
    pub max_expirations: usize,
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_expirations: default_max_expirations(),
            days_per_year: default_days_per_year(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyConfig {
    #[serde(default = "default_sweep_low")]
    pub sweep_low: f64,
    #[serde(default = "default_sweep_high")]
    pub sweep_high: f64,
    #[serde(default = "default_sweep_points")]
    pub sweep_points: usize,
    #[serde(default = "default_diagram_step")]
    pub diagram_step: f64,
    #[serde(default = "default_contract_multiplier")]
    pub contract_multiplier: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            sweep_low: default_sweep_low(),
            sweep_high: default_sweep_high(),
            sweep_points: default_sweep_points(),
            diagram_step: default_diagram_step(),
            contract_multiplier: default_contract_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Prometheus exporter port; metrics are not exported when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            metrics_port: None,
        }
    }
}
