//! Comparison of shared secrets presented by callers.

use sha2::{Digest, Sha256};

/// True when `provided` equals `expected`. Both sides are hashed first so the comparison
/// always runs over 32 bytes, and the fold touches every byte regardless of where they differ.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_identical_secret() {
        assert!(secrets_match("s3cret-token", "s3cret-token"));
        assert!(secrets_match("", ""));
    }

    #[test]
    fn rejects_different_secrets() {
        assert!(!secrets_match("s3cret-tokem", "s3cret-token"));
        assert!(!secrets_match("s3cret", "s3cret-token"));
        assert!(!secrets_match("s3cret-token-extra", "s3cret-token"));
        assert!(!secrets_match("", "s3cret-token"));
    }
}
