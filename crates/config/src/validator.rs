use crate::*;
use thiserror::Error;
use tracing::{error, warn};

const KNOWN_LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("engine.risk_free_rate must be between -1 and 1, got: {0}")]
    InvalidRiskFreeRate(f64),

    #[error("engine.fallback_volatility must be in (0, 5], got: {0}")]
    InvalidFallbackVolatility(f64),

    #[error("chain.max_expirations must be at least 1")]
    NoExpirations,

    #[error("{field} must be a positive float")]
    InvalidPositiveFloat { field: String },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Strategy sweep: {message}")]
    InvalidSweep { message: String },

    #[error("Invalid log format '{0}'. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &OptxConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_engine(&config.engine, &mut report);
    validate_chain(&config.chain, &mut report);
    validate_strategy(&config.strategy, &mut report);
    validate_cache(&config.cache, &mut report);
    validate_logging(&config.logging, &mut report);

    report
}

/// Validate `config` before it is used, logging warnings.
///
/// Fails with every validation error when the config cannot be used.
pub fn ensure_valid(config: &OptxConfig) -> anyhow::Result<ValidationReport> {
    let report = validate_config(config);

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        let messages: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        for message in &messages {
            error!("{}", message);
        }
        anyhow::bail!("Invalid configuration: {}", messages.join("; "));
    }

    Ok(report)
}

fn validate_engine(engine: &EngineConfig, report: &mut ValidationReport) {
    if !(-1.0..=1.0).contains(&engine.risk_free_rate) {
        report.add_error(ValidationError::InvalidRiskFreeRate(engine.risk_free_rate));
    }

    if !(engine.fallback_volatility > 0.0 && engine.fallback_volatility <= 5.0) {
        report.add_error(ValidationError::InvalidFallbackVolatility(
            engine.fallback_volatility,
        ));
    }
}

fn validate_chain(chain: &ChainConfig, report: &mut ValidationReport) {
    if chain.max_expirations == 0 {
        report.add_error(ValidationError::NoExpirations);
    } else if chain.max_expirations > 24 {
        report.add_warning(
            "chain.max_expirations",
            "More than 24 expirations makes every chain lookup slow",
        );
    }

    if !(chain.days_per_year > 0.0) {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "chain.days_per_year".to_string(),
        });
    }
}

fn validate_strategy(strategy: &StrategyConfig, report: &mut ValidationReport) {
    if !(strategy.sweep_low > 0.0 && strategy.sweep_low < 1.0) {
        report.add_error(ValidationError::InvalidSweep {
            message: format!("sweep_low must be in (0, 1), got: {}", strategy.sweep_low),
        });
    }

    if !(strategy.sweep_high > 1.0) {
        report.add_error(ValidationError::InvalidSweep {
            message: format!("sweep_high must be above 1, got: {}", strategy.sweep_high),
        });
    }

    if strategy.sweep_points < 2 {
        report.add_error(ValidationError::InvalidSweep {
            message: format!("sweep_points must be at least 2, got: {}", strategy.sweep_points),
        });
    }

    let span = strategy.sweep_high - strategy.sweep_low;
    if !(strategy.diagram_step > 0.0 && strategy.diagram_step < span) {
        report.add_error(ValidationError::InvalidSweep {
            message: format!(
                "diagram_step must be positive and smaller than the sweep span, got: {}",
                strategy.diagram_step
            ),
        });
    }

    if strategy.contract_multiplier == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "strategy.contract_multiplier".to_string(),
        });
    }
}

fn validate_cache(cache: &CacheConfig, report: &mut ValidationReport) {
    if !cache.enabled {
        report.add_warning("cache.enabled", "Chain cache disabled; every lookup hits the source");
        return;
    }

    if cache.ttl_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "cache.ttl_seconds".to_string(),
        });
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    let format = logging.format.to_lowercase();
    if !KNOWN_LOG_FORMATS.contains(&format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }

    if logging.metrics_port.is_none() {
        report.add_default("logging.metrics_port", "disabled");
    }
}
