//! The digest capability handed to pool workers.

use md5::{Digest, Md5};

use super::Algorithm;
use crate::error::HashError;

/// Computes the digest of one buffer under one algorithm.
///
/// Workers share a single digester, so implementations must be `Send + Sync`.
/// Returning an error fails the whole wave the buffer belongs to.
pub trait Digester: Send + Sync {
    /// Returns the lowercase hex digest of `data`.
    fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError>;
}

/// The production digester: `crc32fast` for CRC32 and `md-5` for MD5.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDigester;

impl StandardDigester {
    /// CRC32 (IEEE) of `data` as 8 zero-padded hex characters.
    pub fn crc32_hex(data: &[u8]) -> String {
        format!("{:08x}", crc32fast::hash(data))
    }

    /// MD5 of `data` as 32 hex characters.
    pub fn md5_hex(data: &[u8]) -> String {
        hex::encode(Md5::digest(data))
    }
}

impl Digester for StandardDigester {
    fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError> {
        Ok(match algorithm {
            Algorithm::Crc32 => Self::crc32_hex(data),
            Algorithm::Md5 => Self::md5_hex(data),
        })
    }
}
