//! Failure taxonomy of the credential core.

use thiserror::Error;

use crate::claims::CredentialKind;

/// Issuance-side failure. Always fatal to the request; never retried.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing key must not be empty")]
    EmptyKey,

    #[error("{0} lifetime must be positive")]
    NonPositiveLifetime(&'static str),

    #[error("{0} lifetime exceeds the one year maximum")]
    LifetimeTooLong(&'static str),

    #[error("access lifetime must be shorter than renewal lifetime")]
    LifetimeOrder,

    #[error("credential expiry is out of range")]
    ExpiryOutOfRange,

    #[error("failed to sign credential: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Verification-side failure.
///
/// The variant is meant for internal logs. Transports must collapse all of
/// them into one generic "unauthorized" answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("credential is malformed")]
    Malformed,

    #[error("credential signature is invalid")]
    InvalidSignature,

    #[error("credential has expired")]
    Expired,

    #[error("credential is not yet valid")]
    NotYetValid,

    #[error("expected {expected} credential")]
    WrongKind { expected: CredentialKind },
}
