//! Process-wide signing context shared by the issuer and the verifier.

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::SigningError;

/// Default access credential lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default renewal credential lifetime (7 days).
pub const DEFAULT_RENEWAL_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Longest lifetime either credential kind may be configured with (1 year).
pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// The one MAC scheme this service signs and accepts.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Secret key, algorithm and lifetimes.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards, so concurrent issue/verify calls need no locking.
#[derive(Clone)]
pub struct SigningContext {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    renewal_ttl: Duration,
}

impl SigningContext {
    pub fn new(
        secret: impl AsRef<[u8]>,
        access_ttl: Duration,
        renewal_ttl: Duration,
    ) -> Result<Self, SigningError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SigningError::EmptyKey);
        }
        if access_ttl <= Duration::zero() {
            return Err(SigningError::NonPositiveLifetime("access"));
        }
        if renewal_ttl <= Duration::zero() {
            return Err(SigningError::NonPositiveLifetime("renewal"));
        }
        if access_ttl > Duration::seconds(MAX_TTL_SECS) {
            return Err(SigningError::LifetimeTooLong("access"));
        }
        if renewal_ttl > Duration::seconds(MAX_TTL_SECS) {
            return Err(SigningError::LifetimeTooLong("renewal"));
        }
        if access_ttl >= renewal_ttl {
            return Err(SigningError::LifetimeOrder);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            renewal_ttl,
        })
    }

    /// Context with the default 15 minute / 7 day lifetimes.
    pub fn with_default_lifetimes(secret: impl AsRef<[u8]>) -> Result<Self, SigningError> {
        Self::new(
            secret,
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(DEFAULT_RENEWAL_TTL_SECS),
        )
    }

    pub fn algorithm(&self) -> Algorithm {
        ALGORITHM
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn renewal_ttl(&self) -> Duration {
        self.renewal_ttl
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub(crate) fn header(&self) -> Header {
        Header::new(ALGORITHM)
    }

    /// Signature-only validation: time checks run afterwards against an
    /// explicit `now`, with zero leeway.
    pub(crate) fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation
    }
}

impl core::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningContext")
            .field("algorithm", &ALGORITHM)
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("renewal_ttl", &self.renewal_ttl)
            .finish()
    }
}
