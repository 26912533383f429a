//! Hashing modes and the concrete algorithms they resolve to.

use std::fmt;
use std::str::FromStr;

use crate::error::HashError;

/// A concrete per-chunk digest algorithm.
///
/// Both are picked for speed, not collision resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// CRC32 (IEEE), rendered as 8 lowercase hex characters.
    Crc32,
    /// MD5, rendered as 32 lowercase hex characters.
    Md5,
}

impl Algorithm {
    /// Length of the hex digest this algorithm produces.
    pub const fn hex_len(self) -> usize {
        match self {
            Algorithm::Crc32 => 8,
            Algorithm::Md5 => 32,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Crc32 => "crc32",
            Algorithm::Md5 => "md5",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The hashing policy requested by the caller.
///
/// `Fast` and `Strong` name an algorithm directly. `Mixed` picks the strong
/// one for small files and the fast one once the chunk count crosses the
/// border count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Always CRC32.
    Fast,
    /// Always MD5.
    Strong,
    /// MD5 up to and including `border_count` chunks, CRC32 above it.
    #[default]
    Mixed,
}

impl Strategy {
    /// Resolves the algorithm for an invocation producing `chunk_count` chunks.
    ///
    /// Called once per invocation so every wave uses the same algorithm.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkhash::{Algorithm, Strategy};
    ///
    /// assert_eq!(Strategy::Mixed.select(100, 100), Algorithm::Md5);
    /// assert_eq!(Strategy::Mixed.select(101, 100), Algorithm::Crc32);
    /// assert_eq!(Strategy::Fast.select(1, 100), Algorithm::Crc32);
    /// ```
    pub fn select(self, chunk_count: usize, border_count: usize) -> Algorithm {
        match self {
            Strategy::Fast => Algorithm::Crc32,
            Strategy::Strong => Algorithm::Md5,
            Strategy::Mixed if chunk_count <= border_count => Algorithm::Md5,
            Strategy::Mixed => Algorithm::Crc32,
        }
    }

    /// Algorithm used when a file fits in a single chunk.
    pub fn single_chunk_algorithm(self) -> Algorithm {
        match self {
            Strategy::Fast => Algorithm::Crc32,
            Strategy::Strong | Strategy::Mixed => Algorithm::Md5,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Fast => "fast",
            Strategy::Strong => "strong",
            Strategy::Mixed => "mixed",
        })
    }
}

impl FromStr for Strategy {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" | "crc32" => Ok(Strategy::Fast),
            "strong" | "md5" => Ok(Strategy::Strong),
            "mixed" => Ok(Strategy::Mixed),
            _ => Err(HashError::InvalidConfig {
                message: "unknown hashing strategy",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_strategies_ignore_count() {
        for count in [0, 1, 100, 101, 10_000] {
            assert_eq!(Strategy::Fast.select(count, 100), Algorithm::Crc32);
            assert_eq!(Strategy::Strong.select(count, 100), Algorithm::Md5);
        }
    }

    #[test]
    fn test_mixed_threshold_is_inclusive() {
        assert_eq!(Strategy::Mixed.select(99, 100), Algorithm::Md5);
        assert_eq!(Strategy::Mixed.select(100, 100), Algorithm::Md5);
        assert_eq!(Strategy::Mixed.select(101, 100), Algorithm::Crc32);
    }

    #[test]
    fn test_single_chunk_algorithm() {
        assert_eq!(Strategy::Fast.single_chunk_algorithm(), Algorithm::Crc32);
        assert_eq!(Strategy::Strong.single_chunk_algorithm(), Algorithm::Md5);
        assert_eq!(Strategy::Mixed.single_chunk_algorithm(), Algorithm::Md5);
    }

    #[test]
    fn test_parse() {
        assert_eq!("fast".parse::<Strategy>().unwrap(), Strategy::Fast);
        assert_eq!("CRC32".parse::<Strategy>().unwrap(), Strategy::Fast);
        assert_eq!("md5".parse::<Strategy>().unwrap(), Strategy::Strong);
        assert_eq!("Mixed".parse::<Strategy>().unwrap(), Strategy::Mixed);
        assert!("sha256".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_default_is_mixed() {
        assert_eq!(Strategy::default(), Strategy::Mixed);
    }
}
