//! Claim model and its JSON wire shape.
//!
//! Access and renewal credentials share one payload shape; the authorization
//! fields (`user_id`, `email`, `role`, `org_id`) are simply absent from
//! renewal payloads. Registered claim names (`iss`, `sub`, `iat`, `nbf`,
//! `exp`) follow RFC 7519 so stock JWT tooling can inspect the tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvara_core::{OrganizationId, SubjectId, ValueObject};

use crate::{Identity, Role, VerificationFailure};

/// Value of the `iss` claim on every credential this service mints.
pub const ISSUER: &str = "pvara-auth";

/// Which claim set / lifetime a credential was minted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Access,
    Renewal,
}

impl core::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CredentialKind::Access => f.write_str("access"),
            CredentialKind::Renewal => f.write_str("renewal"),
        }
    }
}

/// Claims embedded in (and protected by) a credential.
///
/// `email`, `role` and `organization_id` are `Some` exactly for access
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject_id: SubjectId,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub organization_id: Option<OrganizationId>,
    pub issued_at: DateTime<Utc>,
    pub not_before: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
}

impl ValueObject for Claims {}

impl Claims {
    /// Full claim set for an access credential.
    pub fn access(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            email: Some(identity.email.clone()),
            // Canonical tag, so the role read back by the verifier is the one issued.
            role: Some(Role::parse(identity.role.as_str())),
            organization_id: Some(identity.organization_id.clone()),
            ..Self::renewal(identity, issued_at, expires_at)
        }
    }

    /// Subject and timestamps only.
    pub fn renewal(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: identity.subject_id.clone(),
            email: None,
            role: None,
            organization_id: None,
            issued_at,
            not_before: issued_at,
            expires_at,
            issuer: ISSUER.to_string(),
            subject: identity.subject_id.to_string(),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        if self.role.is_some() {
            CredentialKind::Access
        } else {
            CredentialKind::Renewal
        }
    }

    /// Temporal validity at `now`: expiry is checked before activation.
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), VerificationFailure> {
        if now >= self.expires_at {
            return Err(VerificationFailure::Expired);
        }
        if now < self.not_before {
            return Err(VerificationFailure::NotYetValid);
        }
        Ok(())
    }

    pub(crate) fn to_wire(&self) -> WireClaims {
        WireClaims {
            user_id: self.role.as_ref().map(|_| self.subject_id.to_string()),
            email: self.email.clone(),
            role: self.role.clone(),
            org_id: self.organization_id.as_ref().map(|o| o.to_string()),
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
            iat: self.issued_at,
            nbf: Some(self.not_before),
            exp: self.expires_at,
        }
    }

    /// Rebuild domain claims from a signature-checked payload.
    ///
    /// A payload carrying only part of the access field set, a foreign issuer,
    /// a `user_id` that disagrees with `sub`, an `nbf` other than `iat` or an
    /// `exp` not after `iat` is rejected as malformed.
    pub(crate) fn from_wire(wire: WireClaims) -> Result<Self, VerificationFailure> {
        if wire.iss != ISSUER {
            return Err(VerificationFailure::Malformed);
        }
        let not_before = wire.nbf.unwrap_or(wire.iat);
        if not_before != wire.iat || wire.exp <= wire.iat {
            return Err(VerificationFailure::Malformed);
        }

        let subject_id = match &wire.user_id {
            Some(user_id) if *user_id != wire.sub => return Err(VerificationFailure::Malformed),
            Some(user_id) => user_id.clone(),
            None => wire.sub.clone(),
        };
        let subject_id = SubjectId::parse(subject_id).map_err(|_| VerificationFailure::Malformed)?;

        let (email, role, organization_id) = match (wire.user_id, wire.email, wire.role, wire.org_id) {
            (Some(_), Some(email), Some(role), Some(org)) => {
                let org = OrganizationId::parse(org).map_err(|_| VerificationFailure::Malformed)?;
                (Some(email), Some(role), Some(org))
            }
            (None, None, None, None) => (None, None, None),
            _ => return Err(VerificationFailure::Malformed),
        };

        Ok(Self {
            subject_id,
            email,
            role,
            organization_id,
            issued_at: wire.iat,
            not_before,
            expires_at: wire.exp,
            issuer: wire.iss,
            subject: wire.sub,
        })
    }
}

/// Flat JSON payload as it travels inside the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    pub iss: String,
    pub sub: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_seconds_option", skip_serializing_if = "Option::is_none")]
    pub nbf: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}
