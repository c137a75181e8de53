//! Error types for benchmark and baseline operations.

use thiserror::Error;

/// Errors that can occur during baseline persistence and regression analysis.
///
/// A missing baseline file is not an error (see [`crate::BaselineStore::load`]);
/// malformed JSON and filesystem failures are, since silently treating a
/// corrupted baseline as "no baseline" would hide real CI signal.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Baseline not found: {0}")]
    BaselineNotFound(String),
}
