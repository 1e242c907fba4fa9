//! Challenge-bound verification: the full verifier side of the protocol.

use std::sync::Arc;

use tracing::debug;

use super::types::{Proof, ProofOutcome, ProofResult};
use super::verifier::{verify_proof, ProofError};
use crate::challenge::{Challenge, ChallengeManager};
use crate::identity::ProtocolVersion;

/// Issues challenges and verifies the proofs that come back for them.
///
/// Cheap to clone; clones share one [`ChallengeManager`], so a challenge
/// issued through any clone can be redeemed through any other exactly once.
#[derive(Debug, Clone)]
pub struct ChallengeVerifier {
    challenges: Arc<ChallengeManager>,
    version: ProtocolVersion,
}

impl ChallengeVerifier {
    /// Create a verifier that derives AIDs under `version`.
    pub fn new(challenges: Arc<ChallengeManager>, version: ProtocolVersion) -> Self {
        Self {
            challenges,
            version,
        }
    }

    /// The shared challenge store.
    pub fn challenges(&self) -> &Arc<ChallengeManager> {
        &self.challenges
    }

    /// Protocol version used for AID derivation.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Issue a challenge with the manager's default TTL.
    pub fn issue(&self) -> Result<Challenge, ProofError> {
        Ok(self.challenges.generate_default()?)
    }

    /// Verify a proof against an outstanding challenge.
    ///
    /// The challenge is redeemed before anything else, so it is spent even
    /// when the proof turns out to be malformed or wrong. The cryptographic
    /// checks run either way; a stale challenge is reported as
    /// [`ProofOutcome::ChallengeExpiredOrUnknown`] in preference to any
    /// other failure.
    pub fn verify(&self, proof: &Proof) -> Result<ProofResult, ProofError> {
        let fresh = self.challenges.consume(&proof.challenge);

        let result = verify_proof(
            &proof.public_key,
            &proof.challenge,
            &proof.signature,
            &proof.claimed_aid,
            proof.algorithm,
            self.version,
        )?;

        if fresh {
            return Ok(result);
        }
        debug!(aid = %result.derived_aid, "proof rejected: stale challenge");
        Ok(ProofResult::new(
            result.derived_aid,
            ProofOutcome::ChallengeExpiredOrUnknown,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AgentKeypair;

    fn verifier() -> ChallengeVerifier {
        ChallengeVerifier::new(Arc::new(ChallengeManager::default()), ProtocolVersion::V1)
    }

    #[test]
    fn accepts_fresh_challenge_once() {
        let v = verifier();
        let kp = AgentKeypair::generate().unwrap();
        let challenge = v.issue().unwrap();
        let proof = Proof::create(&kp, challenge.as_bytes(), v.version()).unwrap();

        let first = v.verify(&proof).unwrap();
        assert_eq!(first.outcome, ProofOutcome::Valid);

        let replay = v.verify(&proof).unwrap();
        assert_eq!(replay.outcome, ProofOutcome::ChallengeExpiredOrUnknown);
        assert!(!replay.valid);
        assert_eq!(replay.derived_aid, first.derived_aid);
    }

    #[test]
    fn rejects_self_chosen_challenge() {
        let v = verifier();
        let kp = AgentKeypair::generate().unwrap();
        let proof = Proof::create(&kp, &[9u8; 32], v.version()).unwrap();
        assert_eq!(
            v.verify(&proof).unwrap().outcome,
            ProofOutcome::ChallengeExpiredOrUnknown
        );
    }

    #[test]
    fn failed_proof_still_spends_challenge() {
        let v = verifier();
        let kp = AgentKeypair::generate().unwrap();
        let challenge = v.issue().unwrap();

        let mut proof = Proof::create(&kp, challenge.as_bytes(), v.version()).unwrap();
        proof.signature[0] ^= 0x01;
        assert_eq!(v.verify(&proof).unwrap().outcome, ProofOutcome::SignatureInvalid);

        let honest = Proof::create(&kp, challenge.as_bytes(), v.version()).unwrap();
        assert_eq!(
            v.verify(&honest).unwrap().outcome,
            ProofOutcome::ChallengeExpiredOrUnknown
        );
        assert_eq!(v.challenges().outstanding(), 0);
    }

    #[test]
    fn v2_verifier_needs_v2_claim() {
        let v = ChallengeVerifier::new(Arc::new(ChallengeManager::default()), ProtocolVersion::V2);
        let kp = AgentKeypair::generate().unwrap();

        let c = v.issue().unwrap();
        let v1_proof = Proof::create(&kp, c.as_bytes(), ProtocolVersion::V1).unwrap();
        assert_eq!(v.verify(&v1_proof).unwrap().outcome, ProofOutcome::AidMismatch);

        let c = v.issue().unwrap();
        let v2_proof = Proof::create(&kp, c.as_bytes(), ProtocolVersion::V2).unwrap();
        assert!(v.verify(&v2_proof).unwrap().valid);
    }
}
