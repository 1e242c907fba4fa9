//! Proof value types: what a prover sends, and what a verifier answers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::AgentKeypair;
use crate::identity::{derive, AgentId, Algorithm, ProtocolVersion};

use super::verifier::ProofError;

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// A proof of identity: "I hold the key behind `claimed_aid`, and here is my
/// signature over your challenge."
///
/// Ephemeral. It is built for one challenge and is worthless once that
/// challenge has been redeemed. Byte fields serialize as lowercase hex so
/// the JSON form can be pasted around, but framing and transport are the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Signature algorithm the identity is bound to.
    pub algorithm: Algorithm,

    /// Raw public key.
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,

    /// Signature over `challenge`.
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,

    /// The verifier-issued challenge that was signed.
    #[serde(with = "hex::serde")]
    pub challenge: Vec<u8>,

    /// The AID the prover claims. Never trusted; the verifier re-derives it.
    pub claimed_aid: AgentId,
}

impl Proof {
    /// Build a proof for `challenge` with an Ed25519 keypair.
    ///
    /// The claimed AID is derived under `version`, so a prover talking to a
    /// v2 verifier must say so here.
    pub fn create(
        keypair: &AgentKeypair,
        challenge: &[u8],
        version: ProtocolVersion,
    ) -> Result<Self, ProofError> {
        let public_key = keypair.public_key_bytes();
        let claimed_aid = derive(Algorithm::Ed25519, &public_key, version)?;
        Ok(Self {
            algorithm: Algorithm::Ed25519,
            public_key: public_key.to_vec(),
            signature: keypair.sign(challenge).as_bytes().to_vec(),
            challenge: challenge.to_vec(),
            claimed_aid,
        })
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a proof was accepted or rejected.
///
/// `Display` deliberately collapses every rejection into "verification
/// failed"; that is the string to show a remote peer. Use
/// [`ProofOutcome::reason`] for operator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofOutcome {
    /// Signature verified and the AID matched.
    Valid,
    /// The signature did not verify over the challenge.
    SignatureInvalid,
    /// The signature verified but the claimed AID is not the one the public
    /// key derives to.
    AidMismatch,
    /// The challenge was never issued, was already redeemed, or expired.
    ChallengeExpiredOrUnknown,
}

impl ProofOutcome {
    /// Whether this outcome means the proof was accepted.
    pub fn is_valid(self) -> bool {
        matches!(self, ProofOutcome::Valid)
    }

    /// Specific reason, for local logs only.
    pub fn reason(self) -> &'static str {
        match self {
            ProofOutcome::Valid => "valid",
            ProofOutcome::SignatureInvalid => "signature does not verify",
            ProofOutcome::AidMismatch => "claimed AID does not match public key",
            ProofOutcome::ChallengeExpiredOrUnknown => "challenge expired, unknown or already used",
        }
    }
}

impl fmt::Display for ProofOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            f.write_str("valid")
        } else {
            f.write_str("verification failed")
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// The verifier's answer for one proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResult {
    /// `true` only when `outcome` is [`ProofOutcome::Valid`].
    pub valid: bool,

    /// The AID the public key actually derives to, whatever was claimed.
    pub derived_aid: AgentId,

    /// Detailed outcome.
    pub outcome: ProofOutcome,
}

impl ProofResult {
    pub(crate) fn new(derived_aid: AgentId, outcome: ProofOutcome) -> Self {
        Self {
            valid: outcome.is_valid(),
            derived_aid,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_display_generically() {
        for outcome in [
            ProofOutcome::SignatureInvalid,
            ProofOutcome::AidMismatch,
            ProofOutcome::ChallengeExpiredOrUnknown,
        ] {
            assert_eq!(outcome.to_string(), "verification failed");
            assert!(!outcome.is_valid());
            assert_ne!(outcome.reason(), "verification failed");
        }
        assert_eq!(ProofOutcome::Valid.to_string(), "valid");
    }

    #[test]
    fn result_valid_tracks_outcome() {
        let aid = AgentId::from_bytes([7u8; 32]);
        assert!(ProofResult::new(aid, ProofOutcome::Valid).valid);
        assert!(!ProofResult::new(aid, ProofOutcome::AidMismatch).valid);
    }

    #[test]
    fn proof_json_uses_hex_fields() {
        let kp = AgentKeypair::from_seed(&[1u8; 32]);
        let proof = Proof::create(&kp, &[0xAA; 32], ProtocolVersion::V1).unwrap();

        let value = serde_json::to_value(&proof).unwrap();
        assert_eq!(value["algorithm"], "ed25519");
        assert_eq!(value["challenge"], "aa".repeat(32));
        assert_eq!(value["public_key"], hex::encode(kp.public_key_bytes()));
        assert_eq!(value["claimed_aid"].as_str().unwrap().len(), 64);

        let back: Proof = serde_json::from_value(value).unwrap();
        assert_eq!(back, proof);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&ProofOutcome::ChallengeExpiredOrUnknown).unwrap();
        assert_eq!(json, "\"challenge_expired_or_unknown\"");
    }
}
