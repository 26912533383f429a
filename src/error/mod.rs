//! Error types for chunkhash.

use thiserror::Error;

/// Errors that can occur while hashing a file.
///
/// None of these are retried inside the crate. A failed invocation returns no
/// partial digests; callers that want a retry re-run the whole invocation.
#[derive(Debug, Error)]
pub enum HashError {
    /// A source reference required by the execution context is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The execution context is not one the crate supports.
    #[error("environment error: {0}")]
    Environment(String),

    /// A numeric parameter is out of range.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// An I/O error occurred while reading chunk bytes.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A digest computation failed inside a worker.
    #[error("worker failed on wave slot {index}: {message}")]
    Worker {
        /// Position of the failing buffer within its wave.
        index: usize,
        /// What went wrong.
        message: String,
    },

    /// The worker pool was used after it had been terminated.
    #[error("worker pool has been terminated")]
    PoolTerminated,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HashError>;
