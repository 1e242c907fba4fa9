//! # Cryptographic Primitives for SGAIP
//!
//! Everything security-sensitive flows through here: SHA-256 for identity
//! derivation, Ed25519 for proofs, constant-time comparison for anything an
//! attacker could time.
//!
//! Every function is a thin, type-checked wrapper over audited crates
//! (`sha2`, `ed25519-dalek`, `subtle`, `zeroize`). Nothing is hand-rolled,
//! and nothing here should be "optimized" without a timing-attack review.

pub mod compare;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use compare::constant_time_eq;
pub use hash::{sha256, sha256_multi};
pub use keys::{zeroize_secret, AgentKeypair, AgentPublicKey, AgentSignature, KeyError};
pub use signatures::{sign, verify, verify_raw, verify_with, SignatureError};
