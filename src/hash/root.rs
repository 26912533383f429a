//! The root hash type.

use std::fmt;
use std::hash::{Hash as StdHash, Hasher};

/// A file's content identity: the BLAKE3 Merkle root over its chunk digests.
///
/// Formats as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RootHash([u8; 32]);

impl RootHash {
    /// The size of the hash in bytes.
    pub const SIZE: usize = 32;

    /// Creates a root hash from a byte array.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the hash as a byte slice.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hash as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hash from a hex string.
    ///
    /// Returns `None` if the string is not valid hex or not exactly 64 characters.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl From<blake3::Hash> for RootHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash.into())
    }
}

impl AsRef<[u8]> for RootHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl StdHash for RootHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.0);
    }
}

impl fmt::Display for RootHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
