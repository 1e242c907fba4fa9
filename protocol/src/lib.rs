// Copyright (c) 2026 SGAIP Contributors. MIT License.
// See LICENSE for details.

//! # SGAIP: Stateless Agent Identity Protocol
//!
//! An agent's identity is the hash of its public key. Nothing is registered
//! anywhere: whoever holds the key can prove the identity, and whoever sees
//! the key can recompute it.
//!
//! ## Architecture
//!
//! - **config**: protocol constants and challenge tuning. Changing a
//!   constant changes every AID.
//! - **crypto**: SHA-256, Ed25519 and constant-time comparison, wrapped in
//!   types that keep secrets out of logs and wipe them on drop.
//! - **identity**: AID derivation (v1 and algorithm-tagged v2) and the
//!   algorithm registry.
//! - **challenge**: single-use, expiring challenges. The only state here.
//! - **proof**: proof types, stateless verification, and the
//!   challenge-bound verifier.
//! - **error**: crate-level error umbrella.
//!
//! ## Quick tour
//!
//! ```
//! use std::sync::Arc;
//! use sgaip_protocol::{AgentKeypair, ChallengeManager, ChallengeVerifier, Proof, ProtocolVersion};
//!
//! let verifier = ChallengeVerifier::new(Arc::new(ChallengeManager::default()), ProtocolVersion::V1);
//! let agent = AgentKeypair::generate().unwrap();
//!
//! let challenge = verifier.issue().unwrap();
//! let proof = Proof::create(&agent, challenge.as_bytes(), ProtocolVersion::V1).unwrap();
//!
//! assert!(verifier.verify(&proof).unwrap().valid);
//! assert!(!verifier.verify(&proof).unwrap().valid); // replay
//! ```

pub mod challenge;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod proof;

pub use challenge::{Challenge, ChallengeError, ChallengeManager};
pub use config::ChallengeConfig;
pub use crypto::{sign, verify, AgentKeypair, AgentPublicKey, AgentSignature, KeyError, SignatureError};
pub use error::SgaipError;
pub use identity::{derive, derive_aid, AgentId, Algorithm, IdentityError, ProtocolVersion};
pub use proof::{
    verify_proof, verify_proof_hex, ChallengeVerifier, Proof, ProofError, ProofOutcome,
    ProofResult,
};
