//! # Hashing Utilities
//!
//! SGAIP uses exactly one hash function: SHA-256. It is not the fastest
//! option, but every platform, language, and HSM on earth ships it, and AID
//! interoperability matters more than shaving nanoseconds off a function
//! that runs once per proof.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use sgaip_protocol::crypto::sha256;
///
/// let hash = sha256(b"SGAIP");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256_multi(&[data])
}

/// Hash multiple byte slices as if they were concatenated.
///
/// Feeding the parts sequentially into the hasher gives the same digest as
/// hashing `a ‖ b ‖ c` without allocating the concatenation. AID derivation
/// is exactly this shape: `version? ‖ algorithm? ‖ key ‖ domain`.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
