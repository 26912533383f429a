//! Async front end for the hashing pipeline.
//!
//! Chunks are read from any `futures-io` reader that can seek, so this works
//! with tokio (through `tokio_util::compat`), async-std, smol, and other
//! runtimes. Digesting still happens on the worker pool's threads; the
//! calling task only awaits each wave.
//!
//! - [`AsyncRangeReader`] - Reads exact chunk ranges from an async reader
//! - [`FileHasher::hash_async`] - The async counterpart of [`FileHasher::hash`]
//!
//! This module requires the `async-io` feature to be enabled.

mod reader;

use std::pin::pin;

use futures_io::{AsyncRead, AsyncSeek};
use tracing::debug;

use crate::chunker::Chunker;
use crate::error::HashError;
use crate::hasher::{FileHashChunks, FileHasher};
use crate::source::FileMetadata;

pub use reader::AsyncRangeReader;

impl FileHasher {
    /// Hashes the contents of an async reader.
    ///
    /// The reader's length is taken by seeking to its end. `metadata` is
    /// passed through to the result as given.
    ///
    /// Produces the same result as [`FileHasher::hash`] over the same bytes.
    ///
    /// # Errors
    ///
    /// Same as [`FileHasher::hash`].
    pub async fn hash_async<R: AsyncRead + AsyncSeek>(
        &self,
        reader: R,
        metadata: FileMetadata,
    ) -> Result<FileHashChunks, HashError> {
        self.config().validate()?;
        let mut reader = pin!(AsyncRangeReader::new(reader));

        let len = reader.as_mut().len().await?;
        let chunks = Chunker::new(self.config().chunk_size())?.plan(len);

        if let [only] = chunks.as_slice() {
            let algorithm = self.config().strategy().single_chunk_algorithm();
            let buffer = reader.as_mut().read_range(only).await?;
            let digest = self.pool().digester().digest(algorithm, &buffer)?;
            return Ok(self.finish(chunks, vec![digest], algorithm, metadata));
        }

        let algorithm = self.algorithm_for(&chunks);
        // Dropping this future midway still ends the lease.
        let lease = self.pool().lease(self.config().close_immediately());
        let mut digests = Vec::with_capacity(chunks.len());

        for (n, wave) in chunks.chunks(self.wave_size()).enumerate() {
            let mut buffers = Vec::with_capacity(wave.len());
            for range in wave {
                buffers.push(reader.as_mut().read_range(range).await?);
            }

            debug!(wave = n, first = wave[0].index, len = wave.len(), "hashing wave");
            let ticket = lease.submit_async(buffers, algorithm).await?;
            digests.extend(ticket.await?);
        }
        drop(lease);

        Ok(self.finish(chunks, digests, algorithm, metadata))
    }
}
