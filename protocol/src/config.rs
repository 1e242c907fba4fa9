//! # Protocol Configuration & Constants
//!
//! Every protocol constant SGAIP depends on lives here. Two conforming
//! implementations agree on an AID only if they agree on every byte in this
//! file, so edits here are protocol changes, not refactors.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Identity Domains
// ---------------------------------------------------------------------------

/// Domain separation string for protocol version 1. Appended (not
/// prepended) to the public key before hashing.
pub const IDENTITY_DOMAIN_V1: &[u8] = b"SGAIP-v1";

/// Domain separation string for protocol version 2 (algorithm-agile AIDs).
pub const IDENTITY_DOMAIN_V2: &[u8] = b"SGAIP-v2";

/// Version byte prefixed to the v2 derivation preimage.
pub const AID_V2_VERSION_BYTE: u8 = 0x02;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The signature scheme every v1 identity uses.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// The hash that turns a public key into an AID.
pub const HASH_FUNCTION: &str = "SHA-256";

/// Ed25519 secret seed length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// AID length in bytes. SHA-256 output.
pub const AID_LENGTH: usize = 32;

/// AID length in lowercase hex characters.
pub const AID_HEX_LENGTH: usize = AID_LENGTH * 2;

// ---------------------------------------------------------------------------
// Challenges
// ---------------------------------------------------------------------------

/// Minimum challenge length. Anything shorter makes guessing an outstanding
/// challenge cheaper than forging a signature, which defeats the point.
pub const MIN_CHALLENGE_LENGTH: usize = 32;

/// Default challenge length handed out by [`ChallengeConfig::default`].
pub const DEFAULT_CHALLENGE_LENGTH: usize = 32;

/// How long a challenge stays redeemable when the caller has no opinion.
/// One proof round-trip over a slow link fits comfortably in a minute.
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(60);

/// Upper bound on outstanding challenges per manager. Keeps an unauthenticated
/// caller from turning challenge issuance into a memory leak.
pub const MAX_OUTSTANDING_CHALLENGES: usize = 100_000;

/// Tunable parameters for a [`ChallengeManager`](crate::challenge::ChallengeManager).
#[derive(Debug, Clone)]
pub struct ChallengeConfig {
    /// Number of random bytes per challenge. Clamped up to
    /// [`MIN_CHALLENGE_LENGTH`] by the manager.
    pub challenge_len: usize,

    /// TTL used by [`ChallengeManager::generate_default`](crate::challenge::ChallengeManager::generate_default).
    pub default_ttl: Duration,

    /// Maximum number of challenges tracked at once.
    pub max_outstanding: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            challenge_len: DEFAULT_CHALLENGE_LENGTH,
            default_ttl: DEFAULT_CHALLENGE_TTL,
            max_outstanding: MAX_OUTSTANDING_CHALLENGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_are_distinct_ascii() {
        assert_ne!(IDENTITY_DOMAIN_V1, IDENTITY_DOMAIN_V2);
        assert!(IDENTITY_DOMAIN_V1.is_ascii());
        assert!(IDENTITY_DOMAIN_V2.is_ascii());
    }

    #[test]
    fn test_v1_domain_is_bit_exact() {
        // Changing this string re-keys every identity in existence.
        assert_eq!(IDENTITY_DOMAIN_V1, &[0x53, 0x47, 0x41, 0x49, 0x50, 0x2d, 0x76, 0x31]);
    }

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(SIGNING_KEY_LENGTH, 32);
        assert_eq!(VERIFYING_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(AID_LENGTH, 32);
        assert_eq!(AID_HEX_LENGTH, 64);
    }

    #[test]
    fn test_default_challenge_config_sanity() {
        let config = ChallengeConfig::default();
        assert!(config.challenge_len >= MIN_CHALLENGE_LENGTH);
        assert!(config.default_ttl > Duration::ZERO);
        assert!(config.max_outstanding > 0);
    }
}
