//! Fixed-size chunk planning.
//!
//! Splits a file of known size into an ordered sequence of [`ChunkRange`]s.
//! Every range is `chunk_size` bytes except possibly the last. A zero-length
//! file is planned as one zero-length chunk so it still has a digest.
//!
//! # Example
//!
//! ```
//! use chunkhash::Chunker;
//!
//! let chunker = Chunker::new(10)?;
//! let lens: Vec<u64> = chunker.plan(25).iter().map(|c| c.len).collect();
//! assert_eq!(lens, vec![10, 10, 5]);
//! # Ok::<(), chunkhash::HashError>(())
//! ```

use crate::chunk::ChunkRange;
use crate::error::HashError;

/// Plans fixed-size chunk ranges.
///
/// Planning is a pure function of the file size and chunk size; no bytes are
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: u64,
}

impl Chunker {
    /// Creates a planner for `chunk_size`-byte chunks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] if `chunk_size` is zero.
    pub fn new(chunk_size: u64) -> Result<Self, HashError> {
        if chunk_size == 0 {
            return Err(HashError::InvalidConfig {
                message: "chunk size must be non-zero",
            });
        }
        Ok(Self { chunk_size })
    }

    /// Returns the configured chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of chunks a file of `size` bytes produces.
    ///
    /// `ceil(size / chunk_size)`, or 1 for an empty file.
    pub fn chunk_count(&self, size: u64) -> usize {
        if size == 0 {
            return 1;
        }
        size.div_ceil(self.chunk_size) as usize
    }

    /// Plans the ranges covering `[0, size)`.
    pub fn plan(&self, size: u64) -> Vec<ChunkRange> {
        if size == 0 {
            return vec![ChunkRange::new(0, 0, 0)];
        }

        let mut ranges = Vec::with_capacity(self.chunk_count(size));
        let mut offset = 0u64;
        while offset < size {
            let len = self.chunk_size.min(size - offset);
            ranges.push(ChunkRange::new(ranges.len(), offset, len));
            offset += len;
        }
        ranges
    }
}

/// Plans the ranges for a file of `size` bytes split into `chunk_size` chunks.
///
/// # Errors
///
/// Returns [`HashError::InvalidConfig`] if `chunk_size` is zero.
pub fn plan_chunks(size: u64, chunk_size: u64) -> Result<Vec<ChunkRange>, HashError> {
    Ok(Chunker::new(chunk_size)?.plan(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn assert_covers(ranges: &[ChunkRange], size: u64, chunk_size: u64) {
        let mut expected_offset = 0;
        for (i, range) in ranges.iter().enumerate() {
            assert_eq!(range.index, i);
            assert_eq!(range.offset, expected_offset);
            if i + 1 < ranges.len() {
                assert_eq!(range.len, chunk_size);
            } else {
                assert!(range.len <= chunk_size);
            }
            expected_offset += range.len;
        }
        assert_eq!(expected_offset, size);
    }

    #[test]
    fn test_ten_mib_over_twenty_five() {
        let ranges = plan_chunks(25 * MIB, 10 * MIB).unwrap();
        let lens: Vec<u64> = ranges.iter().map(|r| r.len).collect();
        assert_eq!(lens, vec![10 * MIB, 10 * MIB, 5 * MIB]);
    }

    #[test]
    fn test_exact_multiple() {
        let ranges = plan_chunks(30, 10).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2].len, 10);
    }

    #[test]
    fn test_zero_size_is_one_empty_chunk() {
        let ranges = plan_chunks(0, 10).unwrap();
        assert_eq!(ranges, vec![ChunkRange::new(0, 0, 0)]);
    }

    #[test]
    fn test_smaller_than_chunk() {
        let ranges = plan_chunks(3, 10).unwrap();
        assert_eq!(ranges, vec![ChunkRange::new(0, 0, 3)]);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(Chunker::new(0).is_err());
        assert!(plan_chunks(10, 0).is_err());
    }

    #[test]
    fn test_coverage_grid() {
        for size in [1u64, 2, 7, 9, 10, 11, 99, 100, 101, 1000] {
            for chunk_size in [1u64, 3, 10, 64, 1000, 4096] {
                let chunker = Chunker::new(chunk_size).unwrap();
                let ranges = chunker.plan(size);
                assert_eq!(ranges.len(), chunker.chunk_count(size));
                assert_eq!(ranges.len() as u64, size.div_ceil(chunk_size));
                assert_covers(&ranges, size, chunk_size);
            }
        }
    }
}
