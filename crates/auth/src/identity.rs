use serde::{Deserialize, Serialize};

use pvara_core::{OrganizationId, SubjectId, ValueObject};

use crate::Role;

/// Snapshot of an authenticated user, taken when the user directory resolved
/// the login.
///
/// The credential core only reads it; it is not re-validated at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: SubjectId,
    pub email: String,
    pub role: Role,
    pub organization_id: OrganizationId,
}

impl Identity {
    pub fn new(
        subject_id: SubjectId,
        email: impl Into<String>,
        role: Role,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            subject_id,
            email: email.into(),
            role,
            organization_id,
        }
    }
}

impl ValueObject for Identity {}
