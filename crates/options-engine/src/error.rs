//! Options engine error types

use thiserror::Error;

/// Errors that can occur while fetching chains or validating strategies
#[derive(Error, Debug)]
pub enum EngineError {
    /// The market-data source failed
    #[error("Source error: {0}")]
    Source(String),

    /// Unknown symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol or expiration
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    /// A strategy leg is missing fields or carries invalid values
    #[error("Invalid leg {index}: {message}")]
    InvalidLeg { index: usize, message: String },

    /// Reading a snapshot or leg file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot or leg JSON could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid_leg(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidLeg {
            index,
            message: message.into(),
        }
    }
}
