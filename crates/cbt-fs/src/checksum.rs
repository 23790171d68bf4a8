//! SHA-256 digests for short, filesystem-safe identifiers

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest truncated to at most `len` characters.
///
/// Short digests are identifiers, not integrity checks: collisions are
/// possible and callers must tolerate them.
pub fn short_digest(content: &str, len: usize) -> String {
    let mut hex = hex_digest(content.as_bytes());
    hex.truncate(len);
    hex
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
