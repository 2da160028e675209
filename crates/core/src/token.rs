//! Confirmation token key generation.
//!
//! Keys are produced by a [`TokenGenerator`] that the store receives from its
//! caller, so tests can substitute a deterministic generator.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Produces fresh, high-entropy token keys.
///
/// Implementations take no input and must not return an empty string.
/// Returned keys must fit in [`crate::types::limits::TOKEN_KEY_MAX`] characters.
pub trait TokenGenerator: Send + Sync {
    /// Generate a new key.
    fn generate_token(&self) -> String;
}

impl<F> TokenGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate_token(&self) -> String {
        self()
    }
}

/// Default generator: random bytes from the thread-local CSPRNG, encoded as
/// URL-safe base64 without padding.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    bytes: usize,
}

impl RandomTokenGenerator {
    /// Default entropy: 256 bits, 43 characters encoded.
    pub const DEFAULT_BYTES: usize = 32;
    /// 48 bytes encode to exactly 64 characters.
    pub const MAX_BYTES: usize = 48;

    /// Create a generator drawing `bytes` random bytes per key, clamped to
    /// `1..=MAX_BYTES`.
    #[must_use]
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.clamp(1, Self::MAX_BYTES),
        }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BYTES)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate_token(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        rand::rng().fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::limits::TOKEN_KEY_MAX;

    #[test]
    fn test_default_key_shape() {
        let key = RandomTokenGenerator::default().generate_token();
        assert_eq!(key.len(), 43);
        assert!(
            key.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_max_bytes_fit_column() {
        let key = RandomTokenGenerator::new(usize::MAX).generate_token();
        assert_eq!(key.len(), TOKEN_KEY_MAX);
    }

    #[test]
    fn test_zero_bytes_clamped() {
        assert!(!RandomTokenGenerator::new(0).generate_token().is_empty());
    }

    #[test]
    fn test_keys_are_distinct() {
        let generator = RandomTokenGenerator::default();
        let keys: HashSet<String> = (0..256).map(|_| generator.generate_token()).collect();
        assert_eq!(keys.len(), 256);
    }

    #[test]
    fn test_closure_generator() {
        let generator = || "fixed".to_owned();
        assert_eq!(generator.generate_token(), "fixed");
    }
}
