//! The hashing pipeline.
//!
//! [`FileHasher`] plans the chunks of a source, reads them one wave at a
//! time, hands each wave to the worker pool, and folds the ordered digests
//! into a root hash.
//!
//! Waves run strictly one after another: a wave's buffers are moved into the
//! pool and released by the workers before the next wave is read, so at most
//! `max_workers × chunk_size` bytes of chunk data are alive at once.
//!
//! # Example
//!
//! ```
//! use chunkhash::{FileHasher, HashConfig, MemoryFile, PoolHandle};
//!
//! let data: Vec<u8> = (0..5000u32).map(|i| i as u8).collect();
//! let file = MemoryFile::new("data.bin", data);
//!
//! let config = HashConfig::default().with_chunk_size_bytes(1024).with_max_workers(2);
//! let hasher = FileHasher::new(config, PoolHandle::new(2));
//! let out = hasher.hash(&file)?;
//!
//! assert_eq!(out.chunks.len(), 5);
//! assert_eq!(out.chunk_hashes.len(), 5);
//! # Ok::<(), chunkhash::HashError>(())
//! ```

mod output;

use tracing::{debug, info};

use crate::chunk::ChunkRange;
use crate::chunker::Chunker;
use crate::config::{ExecutionContext, HashConfig, HashParams};
use crate::error::HashError;
use crate::hash::{Algorithm, merkle_root};
use crate::pool::{PoolHandle, PoolLease};
use crate::source::{ChunkSource, FileMetadata};

pub use output::FileHashChunks;

/// Drives one or more hashing invocations against a shared pool.
#[derive(Debug, Clone)]
pub struct FileHasher {
    config: HashConfig,
    pool: PoolHandle,
}

impl FileHasher {
    /// Creates a hasher using `pool` for multi-chunk files.
    pub fn new(config: HashConfig, pool: PoolHandle) -> Self {
        Self { config, pool }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Returns the pool handle.
    pub fn pool(&self) -> &PoolHandle {
        &self.pool
    }

    /// Hashes `source`.
    ///
    /// A single-chunk source is digested directly without touching the pool.
    /// Otherwise the chunks go through the pool in waves of
    /// `min(max_workers, pool capacity)`.
    ///
    /// # Errors
    ///
    /// - [`HashError::InvalidConfig`] for an invalid configuration
    /// - [`HashError::Io`] if reading any chunk fails
    /// - [`HashError::Worker`] if any digest fails
    ///
    /// No partial result is returned on failure.
    pub fn hash<S: ChunkSource + ?Sized>(&self, source: &S) -> Result<FileHashChunks, HashError> {
        self.config.validate()?;
        let chunks = Chunker::new(self.config.chunk_size())?.plan(source.len());
        let metadata = source.metadata();

        if let [only] = chunks.as_slice() {
            let algorithm = self.config.strategy().single_chunk_algorithm();
            let buffer = source.read_chunk(only)?;
            let digest = self.pool.digester().digest(algorithm, &buffer)?;
            return Ok(self.finish(chunks, vec![digest], algorithm, metadata));
        }

        let algorithm = self.algorithm_for(&chunks);
        let lease = self.pool.lease(self.config.close_immediately());
        let digests = self.hash_waves(&lease, source, &chunks, algorithm)?;
        drop(lease);

        Ok(self.finish(chunks, digests, algorithm, metadata))
    }

    fn hash_waves<S: ChunkSource + ?Sized>(
        &self,
        lease: &PoolLease,
        source: &S,
        chunks: &[ChunkRange],
        algorithm: Algorithm,
    ) -> Result<Vec<String>, HashError> {
        let mut digests = Vec::with_capacity(chunks.len());

        for (n, wave) in chunks.chunks(self.wave_size()).enumerate() {
            let buffers = wave
                .iter()
                .map(|range| source.read_chunk(range))
                .collect::<std::io::Result<Vec<_>>>()?;

            debug!(wave = n, first = wave[0].index, len = wave.len(), "hashing wave");
            digests.extend(lease.dispatch(buffers, algorithm)?);
        }

        Ok(digests)
    }

    /// Picks the algorithm once for the whole invocation.
    pub(crate) fn algorithm_for(&self, chunks: &[ChunkRange]) -> Algorithm {
        self.config
            .strategy()
            .select(chunks.len(), self.config.border_count())
    }

    pub(crate) fn wave_size(&self) -> usize {
        self.config.max_workers().min(self.pool.capacity()).max(1)
    }

    pub(crate) fn finish(
        &self,
        chunks: Vec<ChunkRange>,
        chunk_hashes: Vec<String>,
        algorithm: Algorithm,
        metadata: FileMetadata,
    ) -> FileHashChunks {
        debug_assert_eq!(chunks.len(), chunk_hashes.len());
        let root_hash = merkle_root(&chunk_hashes);
        info!(
            name = %metadata.name,
            chunks = chunks.len(),
            %algorithm,
            root = %root_hash,
            "hashed file"
        );

        FileHashChunks {
            chunks,
            chunk_hashes,
            root_hash,
            algorithm,
            metadata,
        }
    }
}

/// Normalizes `params` for `context` and hashes the resulting source.
///
/// Multi-chunk files are hashed through `pool`; waves are capped by both the
/// requested worker count and the pool's capacity.
///
/// # Example
///
/// ```
/// use chunkhash::{ExecutionContext, HashParams, MemoryFile, PoolHandle, hash_file_chunks};
///
/// let pool = PoolHandle::default();
/// let params = HashParams::default().file(MemoryFile::new("a.txt", &b"hello"[..]));
/// let out = hash_file_chunks(params, ExecutionContext::Memory, &pool)?;
///
/// assert_eq!(out.chunk_hashes, vec!["5d41402abc4b2a76b9719d911017c592"]);
/// # Ok::<(), chunkhash::HashError>(())
/// ```
pub fn hash_file_chunks(
    params: HashParams,
    context: ExecutionContext,
    pool: &PoolHandle,
) -> Result<FileHashChunks, HashError> {
    let (config, source) = params.normalize(context)?;
    FileHasher::new(config, pool.clone()).hash(&source)
}

/// Tears down `pool` outside the per-invocation lifecycle.
pub fn destroy_pool(pool: &PoolHandle) {
    pool.terminate();
}
