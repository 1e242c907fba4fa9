//! # Agent Identity (AID) Derivation
//!
//! An AID is a SHA-256 digest of a public key and a domain-separation
//! string. Nothing else goes in: no timestamps, no randomness, no registry
//! lookups. Anyone holding the public key can recompute it offline, and two
//! conforming implementations always agree.
//!
//! ```text
//! v1:  AID = SHA-256( public_key ‖ "SGAIP-v1" )
//! v2:  AID = SHA-256( 0x02 ‖ algorithm_id ‖ public_key ‖ "SGAIP-v2" )
//! ```
//!
//! The canonical text form is 64 lowercase hex characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use ed25519_dalek::VerifyingKey;

use super::algorithm::Algorithm;
use crate::config::{
    AID_HEX_LENGTH, AID_LENGTH, AID_V2_VERSION_BYTE, IDENTITY_DOMAIN_V1, IDENTITY_DOMAIN_V2,
};
use crate::crypto::{constant_time_eq, sha256_multi};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from identity derivation and AID parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The public key length does not match the algorithm.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Length required by the algorithm.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// The key has the right length but is not a valid curve point.
    #[error("invalid public key: not a valid point for the algorithm")]
    InvalidPublicKey,

    /// The algorithm identifier is unknown, or not usable here.
    #[error("unsupported algorithm: 0x{0:02x}")]
    UnsupportedAlgorithm(u8),

    /// An AID string was not 64 hex characters.
    #[error("malformed AID: expected 64 hex characters")]
    MalformedAid,
}

// ---------------------------------------------------------------------------
// Protocol version
// ---------------------------------------------------------------------------

/// Protocol version, which selects the identity domain and preimage layout.
///
/// Passed explicitly into every derivation, so several versions can coexist
/// in one process without any global switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// `SHA-256(pk ‖ "SGAIP-v1")`, Ed25519 only.
    #[default]
    V1,
    /// `SHA-256(0x02 ‖ alg ‖ pk ‖ "SGAIP-v2")`.
    V2,
}

impl ProtocolVersion {
    /// The ASCII domain-separation constant for this version.
    pub const fn domain(self) -> &'static [u8] {
        match self {
            ProtocolVersion::V1 => IDENTITY_DOMAIN_V1,
            ProtocolVersion::V2 => IDENTITY_DOMAIN_V2,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1 => f.write_str("v1"),
            ProtocolVersion::V2 => f.write_str("v2"),
        }
    }
}

// ---------------------------------------------------------------------------
// AgentId
// ---------------------------------------------------------------------------

/// A derived Agent Identity: 32 bytes of SHA-256 output.
///
/// Equality is constant-time. `AgentId` is never ground truth; the public key
/// it came from is, and the AID is recomputed whenever it matters.
///
/// # Examples
///
/// ```
/// use sgaip_protocol::identity::{derive_aid, AgentId};
/// use sgaip_protocol::crypto::AgentKeypair;
///
/// let kp = AgentKeypair::generate().unwrap();
/// let aid = derive_aid(&kp.public_key_bytes()).unwrap();
/// assert_eq!(aid.to_hex().len(), 64);
///
/// let parsed: AgentId = aid.to_hex().parse().unwrap();
/// assert_eq!(parsed, aid);
/// ```
#[derive(Clone, Copy, Eq)]
pub struct AgentId {
    bytes: [u8; AID_LENGTH],
}

impl AgentId {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; AID_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; AID_LENGTH] {
        &self.bytes
    }

    /// Canonical form: 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse exactly 64 hex characters. Upper case is accepted; output is
    /// always lower case. Surrounding whitespace is rejected.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        if s.len() != AID_HEX_LENGTH {
            return Err(IdentityError::MalformedAid);
        }
        let mut bytes = [0u8; AID_LENGTH];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| IdentityError::MalformedAid)?;
        Ok(Self { bytes })
    }
}

impl PartialEq for AgentId {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl std::hash::Hash for AgentId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl FromStr for AgentId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.to_hex())
    }
}

impl Serialize for AgentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.bytes)
        }
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            AgentId::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let bytes: [u8; AID_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
                serde::de::Error::custom(format!("expected 32-byte AID, got {}", bytes.len()))
            })?;
            Ok(AgentId { bytes })
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Check that `public_key` is a usable key for `algorithm`.
fn validate_public_key(algorithm: Algorithm, public_key: &[u8]) -> Result<(), IdentityError> {
    let expected = algorithm.spec().public_key_len;
    if public_key.len() != expected {
        return Err(IdentityError::InvalidKeyLength {
            expected,
            got: public_key.len(),
        });
    }
    if algorithm == Algorithm::Ed25519 {
        let bytes: &[u8; 32] = public_key
            .try_into()
            .map_err(|_| IdentityError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(bytes).map_err(|_| IdentityError::InvalidPublicKey)?;
    }
    Ok(())
}

/// Derive an AID for `public_key` under `algorithm` and `version`.
///
/// Pure and deterministic. The key is validated first: wrong length is
/// [`IdentityError::InvalidKeyLength`], an Ed25519 key that does not
/// decompress is [`IdentityError::InvalidPublicKey`]. Protocol v1 predates
/// algorithm tags, so anything other than Ed25519 under v1 is
/// [`IdentityError::UnsupportedAlgorithm`].
pub fn derive(
    algorithm: Algorithm,
    public_key: &[u8],
    version: ProtocolVersion,
) -> Result<AgentId, IdentityError> {
    if version == ProtocolVersion::V1 && algorithm != Algorithm::Ed25519 {
        return Err(IdentityError::UnsupportedAlgorithm(algorithm.id()));
    }
    validate_public_key(algorithm, public_key)?;

    let digest = match version {
        ProtocolVersion::V1 => sha256_multi(&[public_key, version.domain()]),
        ProtocolVersion::V2 => sha256_multi(&[
            &[AID_V2_VERSION_BYTE, algorithm.id()],
            public_key,
            version.domain(),
        ]),
    };
    Ok(AgentId::from_bytes(digest))
}

/// [`derive`] with the algorithm given as a raw wire identifier.
pub fn derive_with_id(
    algorithm_id: u8,
    public_key: &[u8],
    version: ProtocolVersion,
) -> Result<AgentId, IdentityError> {
    derive(Algorithm::from_id(algorithm_id)?, public_key, version)
}

/// Derive a v1 AID from a raw Ed25519 public key.
///
/// This is the everyday entry point: `SHA-256(pk ‖ "SGAIP-v1")`.
pub fn derive_aid(public_key: &[u8]) -> Result<AgentId, IdentityError> {
    derive(Algorithm::Ed25519, public_key, ProtocolVersion::V1)
}
