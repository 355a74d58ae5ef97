//! Options analytics engine for Optx
//!
//! This crate prices European options and analyzes option strategies.
//!
//! # Core Components
//!
//! - [`black_scholes`] - Black-Scholes valuation and Greeks
//! - [`implied_vol`] - Implied volatility via Brent's method
//! - [`chain`] - Options chain normalization and valuation
//! - [`strategy`] - Multi-leg payoff sweep, break-evens and risk bounds
//! - [`templates`] - Canonical strategy skeletons
//! - [`source`] - Market-data sources for raw chains
//! - [`service`] - Cached chain lookups
//!
//! # Key Invariants
//!
//! - Pricing, implied volatility and strategy analysis are pure and never fail
//! - Malformed upstream quote fields are defaulted, never surfaced
//! - Unsolvable implied volatility falls back to 20%
//! - Chain calls and puts are sorted ascending by strike

pub mod black_scholes;
pub mod cache;
pub mod chain;
pub mod coerce;
pub mod error;
pub mod implied_vol;
pub mod numeric;
pub mod service;
pub mod source;
pub mod strategy;
pub mod telemetry;
pub mod templates;
pub mod types;

pub use black_scholes::{black_scholes_greeks, black_scholes_price, intrinsic_value};
pub use cache::TtlCache;
pub use chain::{load_chain, normalize_chain, ChainSettings, ExpirationChain, OptionQuote, OptionsChain};
pub use error::EngineError;
pub use implied_vol::{implied_volatility, implied_volatility_with_fallback};
pub use service::{CacheStatus, ChainResponse, ChainService};
pub use source::{ChainSource, InMemoryChainSource, RawChainSlice, RawOptionsChain, RawQuote};
pub use strategy::{
    analyze_strategy, payoff, LegAction, LegKind, PayoffBound, PayoffDiagram, StrategyAnalysis,
    StrategyAnalyzer, StrategyLeg, StrategySettings,
};
pub use templates::{strategy_templates, template, StrategyTemplate};
pub use types::{BSInputs, Greeks, OptionType};

pub type Result<T> = std::result::Result<T, EngineError>;
