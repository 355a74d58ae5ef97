//! Names of the counters the engine records through the `metrics` facade.

/// Labelled by `outcome`: converged, fallback or expired
pub const IV_SOLVES: &str = "options_iv_solves_total";
/// Labelled by `kind`: call or put
pub const CHAIN_ROWS: &str = "options_chain_rows_total";
pub const CHAIN_EXPIRATIONS_SKIPPED: &str = "options_chain_expirations_skipped_total";
/// Labelled by `result`: hit or miss
pub const CHAIN_CACHE: &str = "options_chain_cache_total";
pub const STRATEGY_ANALYSES: &str = "options_strategy_analyses_total";

pub const ALL: [&str; 5] = [IV_SOLVES, CHAIN_ROWS, CHAIN_EXPIRATIONS_SKIPPED, CHAIN_CACHE, STRATEGY_ANALYSES];
