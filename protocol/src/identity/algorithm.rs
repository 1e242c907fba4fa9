//! # Algorithm Registry
//!
//! SGAIP identities are algorithm-tagged from protocol v2 onward. The set of
//! algorithms is closed: a variant in [`Algorithm`] plus a static
//! [`AlgorithmSpec`] row. There is no plugin mechanism, on purpose, so the
//! full list of things that can mint an identity fits on one screen.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::aid::IdentityError;

/// Static parameters of one signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmSpec {
    /// Wire identifier, mixed into v2 AID derivation.
    pub id: u8,
    /// Human-readable name.
    pub name: &'static str,
    /// Canonical raw public key length.
    pub public_key_len: usize,
    /// Canonical raw secret key (seed) length.
    pub secret_key_len: usize,
    /// Signature length.
    pub signature_len: usize,
    /// Whether this build can sign and verify with the algorithm. AID
    /// derivation only needs the public key length and works regardless.
    pub signing_supported: bool,
}

const ED25519_SPEC: AlgorithmSpec = AlgorithmSpec {
    id: 0x01,
    name: "Ed25519",
    public_key_len: 32,
    secret_key_len: 32,
    signature_len: 64,
    signing_supported: true,
};

// FIPS 204, ML-DSA-65 parameter set.
const ML_DSA_65_SPEC: AlgorithmSpec = AlgorithmSpec {
    id: 0x02,
    name: "ML-DSA-65",
    public_key_len: 1952,
    secret_key_len: 32,
    signature_len: 3309,
    signing_supported: false,
};

/// Signature algorithms an SGAIP identity can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Ed25519 (RFC 8032). The only algorithm protocol v1 knows about.
    Ed25519,
    /// ML-DSA-65 (FIPS 204). Derivation only for now.
    MlDsa65,
}

impl Algorithm {
    /// Every registered algorithm, in identifier order.
    pub const ALL: [Algorithm; 2] = [Algorithm::Ed25519, Algorithm::MlDsa65];

    /// Registry row for this algorithm.
    pub const fn spec(self) -> &'static AlgorithmSpec {
        match self {
            Algorithm::Ed25519 => &ED25519_SPEC,
            Algorithm::MlDsa65 => &ML_DSA_65_SPEC,
        }
    }

    /// Wire identifier.
    pub const fn id(self) -> u8 {
        self.spec().id
    }

    /// Look up an algorithm by wire identifier.
    ///
    /// # Errors
    ///
    /// [`IdentityError::UnsupportedAlgorithm`] for unregistered identifiers.
    pub fn from_id(id: u8) -> Result<Self, IdentityError> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.id() == id)
            .ok_or(IdentityError::UnsupportedAlgorithm(id))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for alg in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(alg.id()).unwrap(), alg);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Algorithm::Ed25519.id(), Algorithm::MlDsa65.id());
    }

    #[test]
    fn test_unknown_id_rejected() {
        assert_eq!(
            Algorithm::from_id(0x00).unwrap_err(),
            IdentityError::UnsupportedAlgorithm(0x00)
        );
        assert!(Algorithm::from_id(0xFF).is_err());
    }

    #[test]
    fn test_ed25519_sizes() {
        let spec = Algorithm::Ed25519.spec();
        assert_eq!(spec.public_key_len, 32);
        assert_eq!(spec.secret_key_len, 32);
        assert_eq!(spec.signature_len, 64);
        assert!(spec.signing_supported);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Algorithm::Ed25519.to_string(), "Ed25519");
        assert_eq!(Algorithm::MlDsa65.to_string(), "ML-DSA-65");
    }
}
