//! Login and renewal flows on top of the credential core.
//!
//! `AuthService` is the piece the transport calls: it resolves the user through
//! the directory, checks the password, mints both credentials and records the
//! login. Credential minting and checking themselves stay in
//! [`CredentialIssuer`] / [`CredentialVerifier`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use pvara_core::{OrganizationId, SubjectId};

use crate::directory::{DirectoryError, UserDirectory};
use crate::password::{self, PasswordError};
use crate::{
    CredentialIssuer, CredentialVerifier, Identity, Role, SigningContext, SigningError,
    VerificationFailure,
};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, inactive user, wrong password or a renewal credential for
    /// a user that is gone. Deliberately one variant.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("credential rejected: {0}")]
    Credential(#[from] VerificationFailure),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Public view of the identity a credential pair was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: SubjectId,
    pub email: String,
    pub role: Role,
    pub organization_id: OrganizationId,
}

impl From<&Identity> for UserSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.subject_id.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            organization_id: identity.organization_id.clone(),
        }
    }
}

/// Access + renewal credential pair as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access credential lifetime in seconds.
    pub expires_in: i64,
    pub user: UserSummary,
}

pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    issuer: CredentialIssuer,
    verifier: CredentialVerifier,
    access_ttl_secs: i64,
}

impl AuthService {
    pub fn new(ctx: Arc<SigningContext>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory,
            access_ttl_secs: ctx.access_ttl().num_seconds(),
            issuer: CredentialIssuer::new(ctx.clone()),
            verifier: CredentialVerifier::new(ctx),
        }
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Password login.
    ///
    /// Directory failures propagate as [`AuthError::Directory`]; every
    /// identity problem collapses into [`AuthError::AuthenticationFailed`].
    /// The last-login update is best-effort and never fails the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedCredentials, AuthError> {
        let record = self.directory.find_active_user(email).await?;

        let hash = record
            .as_ref()
            .map(|r| r.password_hash.clone())
            .unwrap_or_else(|| password::DUMMY_HASH.to_string());
        let matches = password::verify_password_blocking(password.to_owned(), hash).await?;

        let record = match record {
            Some(record) if matches => record,
            _ => {
                tracing::info!("login rejected");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let issued = self.issue_pair(&record.identity)?;

        let subject_id = &record.identity.subject_id;
        if let Err(err) = self.directory.record_last_authenticated(subject_id, Utc::now()).await {
            tracing::warn!(%subject_id, error = %err, "failed to record last login");
        }

        tracing::info!(%subject_id, role = %record.identity.role, "login succeeded");
        Ok(issued)
    }

    /// Trade a renewal credential for a fresh pair.
    ///
    /// The user is re-read so that role / organization changes and
    /// deactivation take effect at the next renewal.
    pub async fn refresh(&self, renewal: &str) -> Result<IssuedCredentials, AuthError> {
        let claims = self.verifier.verify_renewal(renewal).inspect_err(|failure| {
            tracing::debug!(reason = %failure, "renewal credential rejected");
        })?;

        let record = self
            .directory
            .find_active_user_by_id(&claims.subject_id)
            .await?
            .ok_or(AuthError::AuthenticationFailed)?;

        tracing::info!(subject_id = %claims.subject_id, "credentials renewed");
        Ok(self.issue_pair(&record.identity)?)
    }

    fn issue_pair(&self, identity: &Identity) -> Result<IssuedCredentials, SigningError> {
        let access = self.issuer.issue_access(identity)?;
        let renewal = self.issuer.issue_renewal(identity)?;

        Ok(IssuedCredentials {
            access_token: access.into_string(),
            refresh_token: renewal.into_string(),
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
            user: UserSummary::from(identity),
        })
    }
}
