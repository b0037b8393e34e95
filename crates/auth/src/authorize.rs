use thiserror::Error;

use pvara_core::{OrganizationId, SubjectId};

use crate::{Claims, CredentialKind, Role};

/// Authenticated caller, derived from verified access claims.
///
/// No IO and no policy source: everything needed for a decision travels in
/// the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: SubjectId,
    pub email: String,
    pub role: Role,
    pub organization_id: OrganizationId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("credential carries no authorization claims")]
    NotAnAccessCredential,

    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: role '{0}' is not allowed")]
    Forbidden(String),
}

impl TryFrom<&Claims> for Principal {
    type Error = AuthzError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        if claims.kind() != CredentialKind::Access {
            return Err(AuthzError::NotAnAccessCredential);
        }
        match (&claims.email, &claims.role, &claims.organization_id) {
            (Some(email), Some(role), Some(org)) => Ok(Self {
                subject_id: claims.subject_id.clone(),
                email: email.clone(),
                role: role.clone(),
                organization_id: org.clone(),
            }),
            _ => Err(AuthzError::NotAnAccessCredential),
        }
    }
}

/// The principal must act inside `organization_id`.
pub fn authorize_org(principal: &Principal, organization_id: &OrganizationId) -> Result<(), AuthzError> {
    if &principal.organization_id != organization_id {
        return Err(AuthzError::TenantMismatch);
    }
    Ok(())
}

/// The principal's role must be one of `allowed`. `admin` passes any check;
/// an unknown role passes none.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    match &principal.role {
        Role::Unknown(_) => Err(AuthzError::Forbidden(principal.role.to_string())),
        Role::Admin => Ok(()),
        role if allowed.contains(role) => Ok(()),
        role => Err(AuthzError::Forbidden(role.to_string())),
    }
}
