//! Engine error types.

use thiserror::Error;
use zonewatch_store::StoreError;

/// Errors that abort a cycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Snapshot load or flush failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The position source could not produce a batch.
    #[error("position source error: {0}")]
    Source(String),

    /// A non-`SQLite` persistence backend rejected a read or write.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
