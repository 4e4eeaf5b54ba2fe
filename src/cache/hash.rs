//! Hashing for cache keys.

use sha2::{Digest, Sha256};

/// Hex SHA-256 prefix of a connection id.
///
/// Keeps raw connection identifiers out of the cache file while giving each
/// connection its own key namespace.
pub fn connection_hash(connection_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(connection_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
