//! Shared secret presented by remote auto-pull callers.

use std::fmt;

use sha2::{Digest, Sha256};

/// A remote token.
///
/// Equality is computed over SHA-256 digests with a branch-free fold, so
/// the comparison time depends neither on the token length nor on the
/// position of the first differing byte. `Debug` never prints the secret.
#[derive(Clone)]
pub struct RemoteToken(String);

impl RemoteToken {
    /// Wraps a token value, trimming surrounding whitespace.
    ///
    /// Returns `None` for an empty token, which must never authenticate.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Compares two tokens in constant time.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        let lhs = Sha256::digest(self.0.as_bytes());
        let rhs = Sha256::digest(other.0.as_bytes());
        lhs.iter()
            .zip(rhs.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for RemoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RemoteToken(***)")
    }
}
