//! Random nonce strings for JS-SDK request signing.

use rand::distr::{Alphanumeric, SampleString};

/// Nonce length the platform recommends for JS-SDK configurations.
pub const JSSDK_NONCE_LEN: usize = 15;

/// Generate a random alphanumeric string of the given length.
pub fn nonce_string(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_length() {
        assert_eq!(nonce_string(JSSDK_NONCE_LEN).len(), 15);
        assert_eq!(nonce_string(28).len(), 28);
    }

    #[test]
    fn test_nonce_is_alphanumeric() {
        let nonce = nonce_string(64);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_nonces_differ() {
        // 32 alphanumeric chars colliding would mean a broken RNG.
        assert_ne!(nonce_string(32), nonce_string(32));
    }
}
