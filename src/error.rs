//! # Errors

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for proof creation and verification.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while creating or verifying a Linked Data Proof.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad suite configuration (malformed date, non-string identity, bad
    /// template, signer/suite algorithm mismatch).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The operation is not supported by the suite or its primitives.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The verification method (or a proof to verify) could not be found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The verification method has been revoked.
    #[error("verification method revoked: {0}")]
    Revoked(String),

    /// The signature did not verify.
    #[error("invalid signature")]
    SignatureInvalid,

    /// The proof purpose validator rejected the proof.
    #[error("invalid proof purpose: {0}")]
    PurposeInvalid(String),

    /// The document or proof could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// The verification method's key is not usable by the suite.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// A collaborator (document loader, signer) failed.
    #[error("collaborator failure: {0}")]
    Collaborator(#[from] anyhow::Error),
}

impl Error {
    /// The taxonomy kind of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Revoked(_) => ErrorKind::Revoked,
            Self::SignatureInvalid => ErrorKind::SignatureInvalid,
            Self::PurposeInvalid(_) => ErrorKind::PurposeInvalid,
            Self::Canonicalization(_) => ErrorKind::Canonicalization,
            Self::KeyMismatch(_) => ErrorKind::KeyMismatch,
            Self::Collaborator(_) => ErrorKind::Collaborator,
        }
    }
}

/// Error taxonomy, used when reporting failures in verification results.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// See [`Error::Configuration`].
    Configuration,
    /// See [`Error::UnsupportedOperation`].
    UnsupportedOperation,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::Revoked`].
    Revoked,
    /// See [`Error::SignatureInvalid`].
    SignatureInvalid,
    /// See [`Error::PurposeInvalid`].
    PurposeInvalid,
    /// See [`Error::Canonicalization`].
    Canonicalization,
    /// See [`Error::KeyMismatch`].
    KeyMismatch,
    /// See [`Error::Collaborator`].
    Collaborator,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
