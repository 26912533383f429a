//! The ChunkRange type - one fixed-size byte range of a file.

use std::fmt;

/// A contiguous byte range of a file, identified by its position.
///
/// # Example
///
/// ```
/// use chunkhash::ChunkRange;
///
/// let range = ChunkRange::new(2, 20, 5);
/// assert_eq!(range.end(), 25);
/// assert_eq!(range.range(), 20..25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    /// Position in the chunk sequence.
    pub index: usize,

    /// Byte offset of the first byte.
    pub offset: u64,

    /// Number of bytes.
    pub len: u64,
}

impl ChunkRange {
    /// Creates a new range.
    pub const fn new(index: usize, offset: u64, len: u64) -> Self {
        Self { index, offset, len }
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the start offset.
    pub fn start(&self) -> u64 {
        self.offset
    }

    /// Returns the end offset (exclusive), saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.len)
    }

    /// Returns the end offset, or `None` if `offset + len` overflows.
    pub fn checked_end(&self) -> Option<u64> {
        self.offset.checked_add(self.len)
    }

    /// Returns the range as `start..end`.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.start()..self.end()
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk#{}({} bytes @ {})", self.index, self.len, self.offset)
    }
}
