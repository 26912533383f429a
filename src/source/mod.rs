//! Chunk sources.
//!
//! A [`ChunkSource`] is anything the hasher can read chunk bytes from by
//! range. Two are provided, one per execution context:
//!
//! - [`MemoryFile`] - a file already in memory, sliced without copying
//! - [`PathFile`] - a file on disk, read range by range

mod memory;
mod path;

use bytes::Bytes;

use crate::chunk::ChunkRange;

pub use memory::MemoryFile;
pub use path::PathFile;

/// Random-access reader of chunk bytes.
///
/// The hasher reads every range of one wave, hands the buffers to the worker
/// pool, and only then reads the next wave.
pub trait ChunkSource {
    /// Total size of the source in bytes.
    fn len(&self) -> u64;

    /// Returns true if the source has no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads exactly the bytes of `range`.
    fn read_chunk(&self, range: &ChunkRange) -> std::io::Result<Bytes>;

    /// Describes the file being hashed.
    fn metadata(&self) -> FileMetadata;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_chunk(&self, range: &ChunkRange) -> std::io::Result<Bytes> {
        (**self).read_chunk(range)
    }

    fn metadata(&self) -> FileMetadata {
        (**self).metadata()
    }
}

/// Returns the end of `range` if it lies within a source of `len` bytes.
pub(crate) fn checked_range_end(range: &ChunkRange, len: u64) -> std::io::Result<u64> {
    match range.checked_end() {
        Some(end) if end <= len => Ok(end),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("{range} is past the end of a {len}-byte file"),
        )),
    }
}

/// Descriptive metadata passed through to the hashing result unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    /// File name without directories.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time in milliseconds since the Unix epoch, if known.
    pub last_modified: Option<u64>,
    /// File type: the extension with its leading dot for path sources, or
    /// whatever the caller supplied (e.g. a MIME type) for memory sources.
    pub file_type: String,
}

impl FileMetadata {
    /// Size in KiB.
    pub fn size_kib(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}
