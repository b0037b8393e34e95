//! Credential issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::{Claims, CredentialKind, Identity, SigningContext, SigningError};

/// A signed credential string plus the metadata the caller needs to hand it
/// out (kind, expiry).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    kind: CredentialKind,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Mints access and renewal credentials for an already-authenticated identity.
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    ctx: Arc<SigningContext>,
}

impl CredentialIssuer {
    pub fn new(ctx: Arc<SigningContext>) -> Self {
        Self { ctx }
    }

    pub fn issue_access(&self, identity: &Identity) -> Result<Credential, SigningError> {
        self.issue_access_at(identity, Utc::now())
    }

    pub fn issue_renewal(&self, identity: &Identity) -> Result<Credential, SigningError> {
        self.issue_renewal_at(identity, Utc::now())
    }

    /// Access credential valid from `now` for the configured access lifetime.
    pub fn issue_access_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Credential, SigningError> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = expiry(issued_at, self.ctx.access_ttl())?;
        let claims = Claims::access(identity, issued_at, expires_at);
        self.sign(&claims)
    }

    /// Renewal credential valid from `now` for the configured renewal lifetime.
    pub fn issue_renewal_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Credential, SigningError> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = expiry(issued_at, self.ctx.renewal_ttl())?;
        let claims = Claims::renewal(identity, issued_at, expires_at);
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<Credential, SigningError> {
        let token = jsonwebtoken::encode(&self.ctx.header(), &claims.to_wire(), self.ctx.encoding_key())?;

        Ok(Credential {
            token,
            kind: claims.kind(),
            expires_at: claims.expires_at,
        })
    }
}

fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, SigningError> {
    issued_at
        .checked_add_signed(ttl)
        .ok_or(SigningError::ExpiryOutOfRange)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use pvara_core::{OrganizationId, SubjectId};

    use super::*;
    use crate::Role;

    fn issuer() -> CredentialIssuer {
        let ctx = SigningContext::with_default_lifetimes("test-secret").unwrap();
        CredentialIssuer::new(Arc::new(ctx))
    }

    fn identity() -> Identity {
        Identity::new(
            SubjectId::parse("u1").unwrap(),
            "a@b.com",
            Role::Recruiter,
            OrganizationId::parse("org1").unwrap(),
        )
    }

    fn segment(token: &str, idx: usize) -> serde_json::Value {
        let part = token.split('.').nth(idx).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(part).unwrap()).unwrap()
    }

    #[test]
    fn access_payload_matches_identity_exactly() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let credential = issuer().issue_access_at(&identity(), now).unwrap();
        let iat = now.timestamp();

        assert_eq!(credential.as_str().split('.').count(), 3);
        assert_eq!(credential.kind(), CredentialKind::Access);
        assert_eq!(
            segment(credential.as_str(), 1),
            json!({
                "user_id": "u1",
                "email": "a@b.com",
                "role": "recruiter",
                "org_id": "org1",
                "iss": "pvara-auth",
                "sub": "u1",
                "iat": iat,
                "nbf": iat,
                "exp": iat + 900,
            })
        );
    }

    #[test]
    fn header_declares_hs256() {
        let credential = issuer().issue_access(&identity()).unwrap();
        let header = segment(credential.as_str(), 0);
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn renewal_payload_carries_subject_and_timestamps_only() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let credential = issuer().issue_renewal_at(&identity(), now).unwrap();
        let iat = now.timestamp();

        assert_eq!(credential.kind(), CredentialKind::Renewal);
        assert_eq!(credential.expires_at(), now + Duration::days(7));
        assert_eq!(
            segment(credential.as_str(), 1),
            json!({
                "iss": "pvara-auth",
                "sub": "u1",
                "iat": iat,
                "nbf": iat,
                "exp": iat + 7 * 24 * 3600,
            })
        );
    }

    #[test]
    fn subsecond_precision_is_truncated() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap() + Duration::milliseconds(750);
        let credential = issuer().issue_access_at(&identity(), now).unwrap();
        assert_eq!(credential.expires_at(), now.trunc_subsecs(0) + Duration::minutes(15));
    }

    #[test]
    fn expiry_past_the_calendar_range_is_an_error() {
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let err = issuer().issue_renewal_at(&identity(), near_end).unwrap_err();
        assert!(matches!(err, SigningError::ExpiryOutOfRange));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let credential = issuer().issue_access(&identity()).unwrap();
        let dbg = format!("{credential:?}");
        assert!(!dbg.contains(credential.as_str()));
    }
}
