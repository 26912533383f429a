//! Digest algorithms, algorithm selection, and root hash aggregation.
//!
//! - [`Strategy`] / [`Algorithm`] - Hashing mode and the algorithm it resolves to
//! - [`Digester`] - Per-buffer digest capability run by pool workers
//! - [`MerkleHasher`] / [`merkle_root`] - BLAKE3 Merkle root over chunk digests
//! - [`RootHash`] - 32-byte root hash

mod algorithm;
mod digester;
mod merkle;
mod root;

pub use algorithm::{Algorithm, Strategy};
pub use digester::{Digester, StandardDigester};
pub use merkle::{MerkleHasher, merkle_root};
pub use root::RootHash;
