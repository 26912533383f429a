//! chunkhash
//!
//! Parallel chunked file hashing for Rust.
//!
//! `chunkhash` splits a file into fixed-size chunks, digests the chunks on a
//! reusable pool of worker threads, and folds the ordered digests into a
//! single root hash. It is designed for:
//!
//! - resumable and chunked uploads
//! - integrity checks of large files
//! - comparing files chunk by chunk
//!
//! Chunks are hashed in waves of at most `max_workers` chunks, and a wave's
//! buffers are released before the next wave is read, so memory stays
//! bounded by `max_workers × chunk_size` regardless of file size.
//!
//! # Sync
//!
//! ```no_run
//! use chunkhash::{ExecutionContext, HashError, HashParams, PoolHandle, hash_file_chunks};
//!
//! fn main() -> Result<(), HashError> {
//!     let pool = PoolHandle::default();
//!     let params = HashParams::default().path("data.bin").chunk_size_mb(4);
//!     let out = hash_file_chunks(params, ExecutionContext::Filesystem, &pool)?;
//!
//!     for (range, digest) in out.chunks.iter().zip(&out.chunk_hashes) {
//!         println!("{range}: {digest}");
//!     }
//!     println!("root {}", out.root_hash);
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use chunkhash::{FileHasher, FileMetadata, HashConfig, PoolHandle};
//! use tokio_util::compat::TokioAsyncReadCompatExt;
//!
//! async fn demo() -> Result<(), chunkhash::HashError> {
//!     let file = tokio::fs::File::open("data.bin").await?;
//!     let hasher = FileHasher::new(HashConfig::default(), PoolHandle::default());
//!     let out = hasher.hash_async(file.compat(), FileMetadata::default()).await?;
//!     println!("root {}", out.root_hash);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod error;
mod hash;
mod hasher;
mod pool;
mod source;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use chunk::{ChunkRange, HashResult};
pub use chunker::{Chunker, plan_chunks};
pub use config::{
    DEFAULT_BORDER_COUNT, DEFAULT_CHUNK_SIZE_MB, DEFAULT_MAX_WORKERS, ExecutionContext, HashConfig,
    HashParams, HashSource, MIB,
};
pub use error::{HashError, Result};
pub use hash::{Algorithm, Digester, MerkleHasher, RootHash, StandardDigester, Strategy, merkle_root};
pub use hasher::{FileHashChunks, FileHasher, destroy_pool, hash_file_chunks};
pub use pool::{PoolHandle, SlotState, WaveTicket, WorkerPool};
pub use source::{ChunkSource, FileMetadata, MemoryFile, PathFile};

#[cfg(feature = "async-io")]
pub use async_stream::AsyncRangeReader;
