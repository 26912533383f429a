//! In-memory file source.

use std::io;

use bytes::Bytes;

use super::{ChunkSource, FileMetadata, checked_range_end};
use crate::chunk::ChunkRange;

/// A file held in memory.
///
/// Chunk reads are zero-copy slices of the underlying [`Bytes`].
///
/// # Example
///
/// ```
/// use chunkhash::{ChunkRange, ChunkSource, MemoryFile};
///
/// let file = MemoryFile::new("notes.txt", &b"hello world"[..]);
/// let bytes = file.read_chunk(&ChunkRange::new(0, 6, 5))?;
/// assert_eq!(&bytes[..], b"world");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFile {
    data: Bytes,
    name: String,
    last_modified: Option<u64>,
    file_type: String,
}

impl MemoryFile {
    /// Creates a memory file with the given name and contents.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
            last_modified: None,
            file_type: String::new(),
        }
    }

    /// Sets the last modification time (milliseconds since the Unix epoch).
    pub fn with_last_modified(mut self, millis: u64) -> Self {
        self.last_modified = Some(millis);
        self
    }

    /// Sets the file type.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = file_type.into();
        self
    }

    /// Returns the contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ChunkSource for MemoryFile {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_chunk(&self, range: &ChunkRange) -> io::Result<Bytes> {
        let end = checked_range_end(range, self.len())?;
        Ok(self.data.slice(range.offset as usize..end as usize))
    }

    fn metadata(&self) -> FileMetadata {
        FileMetadata {
            name: self.name.clone(),
            size: self.len(),
            last_modified: self.last_modified,
            file_type: self.file_type.clone(),
        }
    }
}
