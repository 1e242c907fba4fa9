//! # Proof Module
//!
//! Proving and checking that a peer holds the key behind an AID.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — Proof, ProofOutcome, ProofResult
//! verifier.rs — stateless signature + AID check (verify_proof)
//! session.rs  — ChallengeVerifier: verify_proof bound to single-use challenges
//! ```
//!
//! ## Flow
//!
//! 1. **Issue**: the verifier hands out a challenge from its
//!    [`ChallengeManager`](crate::challenge::ChallengeManager).
//! 2. **Prove**: the agent signs it and sends a [`Proof`].
//! 3. **Check**: [`ChallengeVerifier::verify`] redeems the challenge, checks
//!    the signature, and re-derives the AID from the public key.

pub mod session;
pub mod types;
pub mod verifier;

pub use session::ChallengeVerifier;
pub use types::{Proof, ProofOutcome, ProofResult};
pub use verifier::{verify_proof, verify_proof_hex, ProofError};
