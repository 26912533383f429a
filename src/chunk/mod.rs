//! Chunk types.
//!
//! - [`ChunkRange`] - Byte range of one chunk
//! - [`HashResult`] - Digest of one chunk, tagged with its index

mod range;

pub use range::ChunkRange;

/// The digest computed for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashResult {
    /// Index of the chunk this digest belongs to.
    pub index: usize,
    /// Lowercase hex digest.
    pub digest: String,
}
