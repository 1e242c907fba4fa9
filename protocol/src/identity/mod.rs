//! # Identity Module
//!
//! Stateless identity derivation. An agent's identity is a pure function of
//! its public key:
//!
//! 1. **Algorithm** — the closed registry of signature schemes an identity
//!    can be bound to, with their canonical key sizes.
//! 2. **AID** — `SHA-256` over the public key plus a version-specific domain
//!    string. No registry, no ledger, no lookup; anybody can recompute it.
//!
//! Nothing in this module holds state or touches the clock, so every
//! function here is safe to call from any number of threads.

pub mod aid;
pub mod algorithm;

pub use aid::{derive, derive_aid, derive_with_id, AgentId, IdentityError, ProtocolVersion};
pub use algorithm::{Algorithm, AlgorithmSpec};
