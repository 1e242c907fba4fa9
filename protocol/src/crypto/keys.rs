//! # Key Management
//!
//! Ed25519 keypair generation and canonical raw-byte accessors for SGAIP
//! agents.
//!
//! The only canonical key encoding SGAIP recognizes is raw: a 32-byte public
//! key and a 32-byte secret seed. PEM, DER, PKCS#8, SPKI and friends are an
//! I/O concern for whoever reads key files; by the time bytes reach this
//! module they are raw or they are rejected.
//!
//! ## Security considerations
//!
//! - The signing key is zeroized on drop (ed25519-dalek's `zeroize` feature).
//!   Every secret buffer this module hands out is wrapped in
//!   [`Zeroizing`], so callers get the same guarantee without remembering to
//!   wipe anything.
//! - Seeds come from `OsRng::try_fill_bytes`. If the OS cannot give us
//!   entropy we return [`KeyError::EntropyUnavailable`] instead of panicking
//!   or, worse, falling back to something predictable.
//! - Key bytes are never logged and never appear in error messages.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{SIGNATURE_LENGTH, SIGNING_KEY_LENGTH, VERIFYING_KEY_LENGTH};

/// Errors that can occur during key operations.
///
/// None of the variants carry key material. Lengths are fine to report;
/// bytes are not.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The operating system RNG could not be read. Fatal; retrying in the
    /// same process is not expected to help.
    #[error("secure random source unavailable")]
    EntropyUnavailable,

    /// Key text could not be decoded into raw bytes.
    #[error("malformed key encoding: {0}")]
    MalformedKeyEncoding(&'static str),

    /// A secret key was not exactly 32 bytes.
    #[error("invalid private key: expected 32 bytes, got {got}")]
    InvalidPrivateKey {
        /// Length that was supplied.
        got: usize,
    },

    /// A public key had the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Length required by the algorithm.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// The 32 bytes do not decode to a point on the Ed25519 curve.
    #[error("invalid public key: not a valid Ed25519 point")]
    InvalidPublicKey,

    /// A signature was not exactly 64 bytes.
    #[error("invalid signature length: expected 64 bytes, got {got}")]
    InvalidSignatureLength {
        /// Length that was supplied.
        got: usize,
    },
}

/// Draw a fresh 32-byte seed from the OS RNG.
fn random_seed() -> Result<Zeroizing<[u8; SIGNING_KEY_LENGTH]>, KeyError> {
    let mut seed = Zeroizing::new([0u8; SIGNING_KEY_LENGTH]);
    OsRng
        .try_fill_bytes(&mut seed[..])
        .map_err(|_| KeyError::EntropyUnavailable)?;
    Ok(seed)
}

/// Overwrite a caller-owned secret buffer before it is released.
///
/// Fills with random bytes and then zeroes. The zeroing is a volatile write
/// and will not be optimized away. If the RNG is unavailable the random pass
/// is skipped; the zero pass always runs.
pub fn zeroize_secret(buf: &mut [u8]) {
    let _ = OsRng.try_fill_bytes(buf);
    buf.zeroize();
}

// ---------------------------------------------------------------------------
// AgentKeypair
// ---------------------------------------------------------------------------

/// An SGAIP agent keypair wrapping an Ed25519 signing key.
///
/// The public half determines the agent's AID; the secret half is the only
/// thing that can prove it. `AgentKeypair` deliberately does not implement
/// `Serialize`: exporting a secret should be an explicit call to
/// [`secret_key_bytes`](Self::secret_key_bytes), not a side effect of
/// dropping a struct into a JSON response.
///
/// # Examples
///
/// ```
/// use sgaip_protocol::crypto::keys::AgentKeypair;
///
/// let kp = AgentKeypair::generate().unwrap();
/// let sig = kp.sign(b"challenge");
/// assert!(kp.public_key().verify(b"challenge", &sig));
/// ```
pub struct AgentKeypair {
    signing_key: SigningKey,
}

impl AgentKeypair {
    /// Generate a fresh keypair from OS entropy.
    ///
    /// # Errors
    ///
    /// [`KeyError::EntropyUnavailable`] if the OS RNG cannot be read.
    pub fn generate() -> Result<Self, KeyError> {
        let seed = random_seed()?;
        Ok(Self::from_seed(&seed))
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the seed *is* the secret key; the public key is derived
    /// from it.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Construct a keypair from a raw secret-key slice.
    ///
    /// # Errors
    ///
    /// [`KeyError::InvalidPrivateKey`] unless the slice is exactly 32 bytes.
    pub fn from_secret_slice(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() != SIGNING_KEY_LENGTH {
            return Err(KeyError::InvalidPrivateKey { got: secret.len() });
        }
        let mut seed = Zeroizing::new([0u8; SIGNING_KEY_LENGTH]);
        seed.copy_from_slice(secret);
        Ok(Self::from_seed(&seed))
    }

    /// Construct a keypair from a hex-encoded secret key.
    ///
    /// The decoded intermediate buffer is wiped before returning, on the
    /// error path too.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str.trim())
                .map_err(|_| KeyError::MalformedKeyEncoding("secret key is not valid hex"))?,
        );
        Self::from_secret_slice(&bytes)
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> AgentPublicKey {
        AgentPublicKey {
            bytes: self.public_key_bytes(),
        }
    }

    /// Canonical raw public key. This is exactly what AID derivation hashes.
    pub fn public_key_bytes(&self) -> [u8; VERIFYING_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Canonical raw secret seed, wiped when the returned value drops.
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; SIGNING_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Sign a message. Deterministic per (key, message), RFC 8032.
    pub fn sign(&self, message: &[u8]) -> AgentSignature {
        AgentSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// The underlying `VerifyingKey`.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Clone for AgentKeypair {
    /// Every clone is another copy of the secret to protect. Both copies
    /// zeroize independently on drop.
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for AgentKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for AgentKeypair {
    /// Equal iff the public keys match. Comparing secrets would need to be
    /// constant-time, and identity is defined by the public half anyway.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for AgentKeypair {}

// ---------------------------------------------------------------------------
// AgentPublicKey
// ---------------------------------------------------------------------------

/// A validated Ed25519 public key in canonical raw form.
///
/// Construction through [`try_from_slice`](Self::try_from_slice) or
/// [`from_hex`](Self::from_hex) checks both length and curve membership, so
/// a value of this type always decompresses.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentPublicKey {
    #[serde(with = "hex::serde")]
    bytes: [u8; VERIFYING_KEY_LENGTH],
}

impl AgentPublicKey {
    /// Validate and wrap raw public key bytes.
    ///
    /// # Errors
    ///
    /// [`KeyError::InvalidKeyLength`] for anything but 32 bytes,
    /// [`KeyError::InvalidPublicKey`] if the bytes are not a curve point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; VERIFYING_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidKeyLength {
                expected: VERIFYING_KEY_LENGTH,
                got: slice.len(),
            })?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse and validate a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim())
            .map_err(|_| KeyError::MalformedKeyEncoding("public key is not valid hex"))?;
        Self::try_from_slice(&bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; VERIFYING_KEY_LENGTH] {
        &self.bytes
    }

    /// Verify a signature with strict RFC 8032 checks.
    ///
    /// Returns `false` for any failure. Small-order keys and non-canonical
    /// signature encodings are rejected rather than tolerated.
    pub fn verify(&self, message: &[u8], signature: &AgentSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify_strict(message, &sig).is_ok()
    }

    /// Convert to an ed25519-dalek `VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Hash for AgentPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for AgentPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AgentPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// AgentSignature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
///
/// Carries no meaning on its own; it is only valid or invalid relative to a
/// (public key, message) pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSignature {
    #[serde(with = "hex::serde")]
    bytes: [u8; SIGNATURE_LENGTH],
}

impl AgentSignature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Wrap a slice, rejecting anything that is not 64 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] = slice
            .try_into()
            .map_err(|_| KeyError::InvalidSignatureLength { got: slice.len() })?;
        Ok(Self { bytes })
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex, 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim())
            .map_err(|_| KeyError::MalformedKeyEncoding("signature is not valid hex"))?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for AgentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AgentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "AgentSignature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
