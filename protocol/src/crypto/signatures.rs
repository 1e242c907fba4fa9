//! # Digital Signatures
//!
//! Ed25519 signing and verification over raw challenge bytes.
//!
//! These are the "bytes off the wire" entry points. Callers hand us whatever
//! their key files and transports produced; we check lengths, then either
//! produce a signature or answer yes/no.
//!
//! ## Errors versus `false`
//!
//! A wrong-length key or signature is an integration bug, so it is an error
//! and the caller hears about it loudly. A signature that simply does not
//! verify is a routine outcome of adversarial input, so it is `Ok(false)`.
//! An off-curve public key falls in the second bucket: an attacker can send
//! one as easily as a bad signature, and it gets the same answer.
//!
//! Verification is `verify_strict`: small-order keys and malleable
//! signatures are rejected.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use thiserror::Error;
use zeroize::Zeroizing;

use super::keys::{AgentKeypair, AgentSignature};
use crate::identity::Algorithm;
use crate::config::{SIGNATURE_LENGTH, SIGNING_KEY_LENGTH, VERIFYING_KEY_LENGTH};

/// Errors during signature operations.
///
/// Only malformed input is an error. Failed verification is `Ok(false)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A fixed-size input had the wrong length.
    #[error("invalid {field} length: expected {expected} bytes, got {got}")]
    InvalidInputLength {
        /// Which input was wrong.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// The private key failed canonical validation.
    #[error("invalid private key: expected 32 raw bytes, got {got}")]
    InvalidPrivateKey {
        /// Supplied length.
        got: usize,
    },

    /// The algorithm is registered but this build cannot sign or verify
    /// with it.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(Algorithm),
}

fn check_len(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), SignatureError> {
    if bytes.len() != expected {
        return Err(SignatureError::InvalidInputLength {
            field,
            expected,
            got: bytes.len(),
        });
    }
    Ok(())
}

/// Sign a challenge with a raw 32-byte Ed25519 secret seed.
///
/// No pre-hashing: the challenge bytes go straight into Ed25519, which hashes
/// internally with SHA-512. The seed is copied into a [`Zeroizing`] buffer and
/// the signing key zeroizes on drop, so nothing outlives this call.
///
/// # Example
///
/// ```
/// use sgaip_protocol::crypto::{sign, verify, AgentKeypair};
///
/// let kp = AgentKeypair::generate().unwrap();
/// let sig = sign(kp.secret_key_bytes().as_slice(), b"challenge").unwrap();
/// assert!(verify(&kp.public_key_bytes(), b"challenge", sig.as_bytes()).unwrap());
/// ```
pub fn sign(private_key: &[u8], challenge: &[u8]) -> Result<AgentSignature, SignatureError> {
    if private_key.len() != SIGNING_KEY_LENGTH {
        return Err(SignatureError::InvalidPrivateKey {
            got: private_key.len(),
        });
    }
    let mut seed = Zeroizing::new([0u8; SIGNING_KEY_LENGTH]);
    seed.copy_from_slice(private_key);
    Ok(AgentKeypair::from_seed(&seed).sign(challenge))
}

/// Verify an Ed25519 signature over raw bytes.
///
/// # Errors
///
/// [`SignatureError::InvalidInputLength`] if the public key is not 32 bytes
/// or the signature is not 64 bytes. Everything else is a boolean.
pub fn verify(
    public_key: &[u8],
    challenge: &[u8],
    signature: &[u8],
) -> Result<bool, SignatureError> {
    check_len("public key", public_key, VERIFYING_KEY_LENGTH)?;
    check_len("signature", signature, SIGNATURE_LENGTH)?;

    let mut pk = [0u8; VERIFYING_KEY_LENGTH];
    pk.copy_from_slice(public_key);
    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig.copy_from_slice(signature);

    Ok(verify_raw(&pk, challenge, &sig))
}

/// Verify under an explicit algorithm from the registry.
///
/// Lengths are checked against the registry row, so a signature of the
/// wrong size for `algorithm` is an error rather than `false`.
///
/// # Errors
///
/// [`SignatureError::UnsupportedAlgorithm`] for algorithms that are
/// registered for derivation only.
pub fn verify_with(
    algorithm: Algorithm,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, SignatureError> {
    if !algorithm.spec().signing_supported {
        return Err(SignatureError::UnsupportedAlgorithm(algorithm));
    }
    match algorithm {
        Algorithm::Ed25519 => verify(public_key, message, signature),
        other => Err(SignatureError::UnsupportedAlgorithm(other)),
    }
}

/// Verify with fixed-size inputs. No length errors are possible here.
pub fn verify_raw(
    public_key: &[u8; VERIFYING_KEY_LENGTH],
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let signature = DalekSignature::from_bytes(signature);
    verifying_key.verify_strict(message, &signature).is_ok()
}
