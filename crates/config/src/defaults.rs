pub fn default_enabled() -> bool {
    true
}

pub fn default_risk_free_rate() -> f64 {
    0.05
}

pub fn default_fallback_volatility() -> f64 {
    0.20
}

pub fn default_max_expirations() -> usize {
    6
}

pub fn default_days_per_year() -> f64 {
    365.0
}

pub fn default_sweep_low() -> f64 {
    0.7
}

pub fn default_sweep_high() -> f64 {
    1.3
}

pub fn default_sweep_points() -> usize {
    100
}

pub fn default_diagram_step() -> f64 {
    0.01
}

pub fn default_contract_multiplier() -> u32 {
    100
}

pub fn default_ttl_seconds() -> u64 {
    24 * 60 * 60
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
