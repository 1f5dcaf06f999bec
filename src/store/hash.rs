//! Content hashing for store keys.

use sha2::{Digest, Sha256};

/// SHA256 of a raw payload as a 64-character lowercase hex string.
pub fn compute_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}
