//! Content fingerprints for duplicate detection.

use sha2::{Digest, Sha256};

/// Length of a rendered fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// SHA-256 of the raw buffer bytes as lowercase hex.
pub fn fingerprint(buffer: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buffer);
    hex::encode(hasher.finalize())
}
