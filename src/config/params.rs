//! Caller parameters and their normalization.
//!
//! Everything optional is defaulted here, and the source reference required
//! by the execution context is checked here, so the hashing pipeline itself
//! never inspects its environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bytes::Bytes;

use super::{DEFAULT_BORDER_COUNT, DEFAULT_CHUNK_SIZE_MB, DEFAULT_MAX_WORKERS, HashConfig};
use crate::chunk::ChunkRange;
use crate::error::HashError;
use crate::hash::Strategy;
use crate::source::{ChunkSource, FileMetadata, MemoryFile, PathFile};

/// Where the file to hash lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// The file is supplied in memory.
    Memory,
    /// The file is read from a filesystem path.
    Filesystem,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionContext::Memory => "memory",
            ExecutionContext::Filesystem => "filesystem",
        })
    }
}

impl FromStr for ExecutionContext {
    type Err = HashError;

    /// Parses a context tag.
    ///
    /// Accepts `memory`/`browser` and `filesystem`/`fs`/`node`; anything
    /// else is an [`HashError::Environment`] error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "browser" => Ok(ExecutionContext::Memory),
            "filesystem" | "fs" | "node" => Ok(ExecutionContext::Filesystem),
            other => Err(HashError::Environment(format!(
                "unsupported execution context `{other}`"
            ))),
        }
    }
}

/// Optional hashing parameters as a caller supplies them.
///
/// # Example
///
/// ```
/// use chunkhash::{ExecutionContext, HashParams, MemoryFile};
///
/// let params = HashParams::default()
///     .file(MemoryFile::new("a.txt", &b"hello"[..]))
///     .chunk_size_mb(1);
/// let (config, source) = params.normalize(ExecutionContext::Memory)?;
/// assert!(config.close_immediately());
/// # Ok::<(), chunkhash::HashError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HashParams {
    /// In-memory file; required in [`ExecutionContext::Memory`].
    pub file: Option<MemoryFile>,
    /// Path to the file; required in [`ExecutionContext::Filesystem`].
    pub path: Option<PathBuf>,
    /// Chunk size in MiB (default 10).
    pub chunk_size_mb: Option<u64>,
    /// Wave size / pool capacity (default 8).
    pub max_workers: Option<usize>,
    /// Hashing strategy (default mixed).
    pub strategy: Option<Strategy>,
    /// Mixed-mode threshold (default 100).
    pub border_count: Option<usize>,
    /// Terminate the pool after this invocation (default true).
    pub close_immediately: Option<bool>,
}

impl HashParams {
    /// Sets the in-memory file.
    pub fn file(mut self, file: MemoryFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Sets the file path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the chunk size in MiB.
    pub fn chunk_size_mb(mut self, mb: u64) -> Self {
        self.chunk_size_mb = Some(mb);
        self
    }

    /// Sets the worker count.
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Sets the strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the mixed-mode border count.
    pub fn border_count(mut self, count: usize) -> Self {
        self.border_count = Some(count);
        self
    }

    /// Sets whether to terminate the pool after the invocation.
    pub fn close_immediately(mut self, close: bool) -> Self {
        self.close_immediately = Some(close);
        self
    }

    /// Applies defaults and resolves the source for `context`.
    ///
    /// # Errors
    ///
    /// - [`HashError::Configuration`] if the source required by `context` is missing
    /// - [`HashError::InvalidConfig`] if a supplied value is zero
    /// - [`HashError::Io`] if the path cannot be opened
    pub fn normalize(self, context: ExecutionContext) -> Result<(HashConfig, HashSource), HashError> {
        let config = HashConfig::default()
            .with_chunk_size_mb(self.chunk_size_mb.unwrap_or(DEFAULT_CHUNK_SIZE_MB))
            .with_max_workers(self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS))
            .with_strategy(self.strategy.unwrap_or_default())
            .with_border_count(self.border_count.unwrap_or(DEFAULT_BORDER_COUNT))
            .with_close_immediately(self.close_immediately.unwrap_or(true));
        config.validate()?;

        let source = match context {
            ExecutionContext::Memory => match self.file {
                Some(file) => HashSource::Memory(file),
                None => {
                    return Err(HashError::Configuration(
                        "the file attribute is required in the memory context".into(),
                    ));
                }
            },
            ExecutionContext::Filesystem => match self.path {
                Some(path) => HashSource::Path(PathFile::open(path)?),
                None => {
                    return Err(HashError::Configuration(
                        "the path attribute is required in the filesystem context".into(),
                    ));
                }
            },
        };

        Ok((config, source))
    }
}

/// The source picked by [`HashParams::normalize`].
#[derive(Debug)]
pub enum HashSource {
    /// An in-memory file.
    Memory(MemoryFile),
    /// A file on disk.
    Path(PathFile),
}

impl ChunkSource for HashSource {
    fn len(&self) -> u64 {
        match self {
            HashSource::Memory(f) => f.len(),
            HashSource::Path(f) => f.len(),
        }
    }

    fn read_chunk(&self, range: &ChunkRange) -> std::io::Result<Bytes> {
        match self {
            HashSource::Memory(f) => f.read_chunk(range),
            HashSource::Path(f) => f.read_chunk(range),
        }
    }

    fn metadata(&self) -> FileMetadata {
        match self {
            HashSource::Memory(f) => f.metadata(),
            HashSource::Path(f) => f.metadata(),
        }
    }
}
