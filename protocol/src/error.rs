//! Crate-level error type.
//!
//! Each module has its own error enum. [`SgaipError`] collects them for
//! callers who drive several modules and want a single `?` target.

use thiserror::Error;

use crate::challenge::ChallengeError;
use crate::crypto::{KeyError, SignatureError};
use crate::identity::IdentityError;
use crate::proof::ProofError;

/// Any error this crate can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SgaipError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error(transparent)]
    Proof(#[from] ProofError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SgaipError>;
