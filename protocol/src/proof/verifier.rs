//! Stateless proof verification.
//!
//! A proof is accepted only if both checks pass:
//!
//! 1. **Signature**: the signature verifies over the challenge under the
//!    supplied public key.
//! 2. **Identity**: the AID re-derived from that public key equals the
//!    claimed AID, compared in constant time.
//!
//! Both checks always run. Which one failed is visible in the returned
//! [`ProofOutcome`], never in how long verification took.
//!
//! Challenge freshness is not checked here; see
//! [`ChallengeVerifier`](super::session::ChallengeVerifier).

use thiserror::Error;
use tracing::debug;

use super::types::{ProofOutcome, ProofResult};
use crate::challenge::ChallengeError;
use crate::crypto::{constant_time_eq, verify_with, KeyError, SignatureError};
use crate::identity::{derive, AgentId, Algorithm, IdentityError, ProtocolVersion};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while handling a proof.
///
/// These cover malformed input and environmental failure only. A proof that
/// is well-formed but wrong is an `Ok` with a failing [`ProofOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// Identity derivation or AID parsing failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Signature input was malformed or the algorithm cannot verify.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Key material could not be produced or parsed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A challenge could not be issued.
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify a proof of identity.
///
/// # Errors
///
/// - [`SignatureError::InvalidInputLength`] for a wrong-length key or
///   signature.
/// - [`SignatureError::UnsupportedAlgorithm`] for derivation-only
///   algorithms.
/// - [`IdentityError`] if the public key cannot be turned into an AID at
///   all, including an Ed25519 key that is not a curve point.
pub fn verify_proof(
    public_key: &[u8],
    challenge: &[u8],
    signature: &[u8],
    claimed_aid: &AgentId,
    algorithm: Algorithm,
    version: ProtocolVersion,
) -> Result<ProofResult, ProofError> {
    let signature_ok = verify_with(algorithm, public_key, challenge, signature)?;
    let derived_aid = derive(algorithm, public_key, version)?;
    let aid_ok = constant_time_eq(derived_aid.as_bytes(), claimed_aid.as_bytes());

    let outcome = match (signature_ok, aid_ok) {
        (true, true) => ProofOutcome::Valid,
        (false, _) => ProofOutcome::SignatureInvalid,
        (true, false) => ProofOutcome::AidMismatch,
    };

    debug!(
        aid = %derived_aid,
        %algorithm,
        %version,
        outcome = outcome.reason(),
        "proof verified"
    );
    Ok(ProofResult::new(derived_aid, outcome))
}

/// Verify an Ed25519, protocol v1 proof whose claimed AID arrives as text.
///
/// # Errors
///
/// As [`verify_proof`], plus [`IdentityError::MalformedAid`] when
/// `claimed_aid` is not 64 hex characters.
pub fn verify_proof_hex(
    public_key: &[u8],
    challenge: &[u8],
    signature: &[u8],
    claimed_aid: &str,
) -> Result<ProofResult, ProofError> {
    let claimed = AgentId::from_hex(claimed_aid)?;
    verify_proof(
        public_key,
        challenge,
        signature,
        &claimed,
        Algorithm::Ed25519,
        ProtocolVersion::V1,
    )
}
