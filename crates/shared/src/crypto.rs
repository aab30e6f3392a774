//! Cryptographic utilities for session token hashing.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns a short, log-safe fingerprint of a session token.
///
/// Only the first 8 hex characters of the token hash are kept, so the value
/// can be correlated across log lines without exposing the token.
pub fn token_fingerprint(token: &str) -> String {
    let mut hash = sha256_hex(token);
    hash.truncate(8);
    hash
}
