//! Root hash aggregation.
//!
//! The root hash is a binary BLAKE3 Merkle tree over the ordered chunk
//! digests. It is the file's public identity, so the construction is fixed:
//!
//! - leaf: `BLAKE3(0x00 || digest)` where `digest` is the UTF-8 hex string
//! - parent: `BLAKE3(0x01 || left || right)` over the 32-byte child hashes
//! - an odd node at the end of a level is promoted to the next level as is
//! - the root is the last remaining node
//!
//! A single digest yields its own leaf. An empty list yields `BLAKE3(0x02)`,
//! distinct from the root of one empty digest; the pipeline never produces
//! one because a zero-length file still has one zero-length chunk.

use super::RootHash;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;
const EMPTY_TAG: u8 = 0x02;

/// Incremental Merkle tree builder.
///
/// Digests are pushed in chunk order; [`MerkleHasher::finalize`] folds the
/// levels. Holds one 32-byte leaf per pushed digest.
#[derive(Debug, Clone, Default)]
pub struct MerkleHasher {
    leaves: Vec<[u8; 32]>,
}

impl MerkleHasher {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { leaves: Vec::new() }
    }

    /// Creates a builder with room for `n` digests.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            leaves: Vec::with_capacity(n),
        }
    }

    /// Appends the next chunk digest.
    pub fn update(&mut self, digest: &str) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[LEAF_PREFIX]);
        hasher.update(digest.as_bytes());
        self.leaves.push(hasher.finalize().into());
    }

    /// Number of digests pushed so far.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns true if no digest has been pushed.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Folds the tree and returns the root.
    pub fn finalize(&self) -> RootHash {
        if self.leaves.is_empty() {
            return blake3::hash(&[EMPTY_TAG]).into();
        }

        let mut level = self.leaves.clone();
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => parent(left, right),
                    // Odd node out: promoted unchanged.
                    _ => pair[0],
                })
                .collect();
        }
        RootHash::new(level[0])
    }

    /// Clears all pushed digests.
    pub fn reset(&mut self) {
        self.leaves.clear();
    }
}

fn parent(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Computes the root hash of an ordered digest list.
///
/// # Example
///
/// ```
/// use chunkhash::merkle_root;
///
/// let a = merkle_root(&["aa".to_string(), "bb".to_string()]);
/// let b = merkle_root(&["bb".to_string(), "aa".to_string()]);
/// assert_ne!(a, b);
/// ```
pub fn merkle_root<S: AsRef<str>>(digests: &[S]) -> RootHash {
    let mut hasher = MerkleHasher::with_capacity(digests.len());
    for digest in digests {
        hasher.update(digest.as_ref());
    }
    hasher.finalize()
}
