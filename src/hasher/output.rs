//! The result of hashing one file.

use crate::chunk::{ChunkRange, HashResult};
use crate::hash::{Algorithm, RootHash};
use crate::source::FileMetadata;

/// Everything one hashing invocation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHashChunks {
    /// The planned chunk ranges, in order.
    pub chunks: Vec<ChunkRange>,
    /// One digest per chunk, in chunk order.
    pub chunk_hashes: Vec<String>,
    /// Merkle root over `chunk_hashes`.
    pub root_hash: RootHash,
    /// Algorithm the chunk digests were computed with.
    pub algorithm: Algorithm,
    /// Source metadata, passed through unchanged.
    pub metadata: FileMetadata,
}

impl FileHashChunks {
    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false: even an empty file has one chunk.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over `(index, digest)` pairs in chunk order.
    pub fn results(&self) -> impl Iterator<Item = HashResult> + '_ {
        self.chunk_hashes
            .iter()
            .enumerate()
            .map(|(index, digest)| HashResult {
                index,
                digest: digest.clone(),
            })
    }
}
