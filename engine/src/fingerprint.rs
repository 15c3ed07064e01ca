//! Stable content hashes for comparing game states across runs and tools.

use std::io;

use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hashes the compact JSON encoding of `state`.
///
/// Only meaningful for types whose serialization is order-stable (no hash maps).
pub fn state_sha256_hex<T: Serialize>(state: &T) -> io::Result<String> {
    let bytes =
        serde_json::to_vec(state).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(sha256_hex(&bytes))
}
