//! Observability infrastructure for Optx
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus export of the engine's counters
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("optx", LogFormat::Pretty)?;
//!
//! // Optional: expose counters at http://0.0.0.0:9100/metrics
//! observability::init_metrics(9100)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{describe_engine_metrics, init_metrics};
