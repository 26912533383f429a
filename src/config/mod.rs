//! Configuration for chunked hashing.
//!
//! This module provides the types that control an invocation:
//!
//! - [`HashConfig`] - Normalized chunk size, worker count, strategy and pool policy
//! - [`HashParams`] - Optional caller parameters, normalized against an
//!   [`ExecutionContext`]
//!
//! # Example
//!
//! ```
//! use chunkhash::{HashConfig, Strategy};
//!
//! let config = HashConfig::default()
//!     .with_chunk_size_mb(4)
//!     .with_max_workers(2)
//!     .with_strategy(Strategy::Fast)
//!     .with_close_immediately(false);
//! config.validate()?;
//!
//! # Ok::<(), chunkhash::HashError>(())
//! ```

mod params;

use crate::error::HashError;
use crate::hash::Strategy;

pub use params::{ExecutionContext, HashParams, HashSource};

/// Bytes in one MiB. Chunk sizes are given in MiB.
pub const MIB: u64 = 1024 * 1024;

/// Default chunk size in MiB.
pub const DEFAULT_CHUNK_SIZE_MB: u64 = 10;

/// Default worker pool capacity and wave size.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default chunk count up to which [`Strategy::Mixed`] uses MD5.
pub const DEFAULT_BORDER_COUNT: usize = 100;

/// Worker count used when the hardware parallelism cannot be queried.
const FALLBACK_HARDWARE_WORKERS: usize = 4;

/// Normalized configuration for one hashing invocation.
///
/// Builder setters do not validate; call [`HashConfig::validate`] (the
/// hasher does so before doing any work).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Chunk size in bytes.
    chunk_size: u64,

    /// Upper bound on chunks hashed in parallel, i.e. the wave size.
    max_workers: usize,

    /// Hashing mode.
    strategy: Strategy,

    /// Mixed-mode threshold.
    border_count: usize,

    /// Tear the pool down at the end of the invocation.
    close_immediately: bool,
}

impl HashConfig {
    /// Sets the chunk size in MiB.
    pub fn with_chunk_size_mb(mut self, mb: u64) -> Self {
        self.chunk_size = mb.saturating_mul(MIB);
        self
    }

    /// Sets the chunk size in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkhash::HashConfig;
    ///
    /// let config = HashConfig::default().with_chunk_size_bytes(64 * 1024);
    /// assert_eq!(config.chunk_size(), 65536);
    /// ```
    pub fn with_chunk_size_bytes(mut self, bytes: u64) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Sets the wave size.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Sets the wave size from the machine's available parallelism.
    pub fn with_hardware_workers(mut self) -> Self {
        self.max_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_HARDWARE_WORKERS);
        self
    }

    /// Sets the hashing strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the mixed-mode border count.
    pub fn with_border_count(mut self, count: usize) -> Self {
        self.border_count = count;
        self
    }

    /// Sets whether the pool is terminated after the invocation.
    pub fn with_close_immediately(mut self, close: bool) -> Self {
        self.close_immediately = close;
        self
    }

    /// Returns the chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the wave size.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Returns the hashing strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the mixed-mode border count.
    pub fn border_count(&self) -> usize {
        self.border_count
    }

    /// Returns whether the pool is terminated after the invocation.
    pub fn close_immediately(&self) -> bool {
        self.close_immediately
    }

    /// Validates the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] if the chunk size, worker count
    /// or border count is zero.
    pub fn validate(&self) -> Result<(), HashError> {
        if self.chunk_size == 0 {
            return Err(HashError::InvalidConfig {
                message: "chunk size must be non-zero",
            });
        }
        if self.max_workers == 0 {
            return Err(HashError::InvalidConfig {
                message: "worker count must be non-zero",
            });
        }
        if self.border_count == 0 {
            return Err(HashError::InvalidConfig {
                message: "border count must be non-zero",
            });
        }
        Ok(())
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE_MB * MIB,
            max_workers: DEFAULT_MAX_WORKERS,
            strategy: Strategy::Mixed,
            border_count: DEFAULT_BORDER_COUNT,
            close_immediately: true,
        }
    }
}
