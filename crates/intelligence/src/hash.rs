//! Stable session hashing
//!
//! Identity, strategy, and skill-variant selection must resolve the same
//! way for a given session across process restarts and platforms, so the
//! hash is SHA-256 rather than the std hasher.

use sha2::{Digest, Sha256};

/// Stable 64-bit hash of a session key with a salt
pub fn stable_hash(session_id: &str, salt: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Stable index into a pool of `len` options
///
/// Returns `None` for an empty pool.
pub fn stable_index(session_id: &str, salt: &str, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((stable_hash(session_id, salt) % len as u64) as usize)
}
