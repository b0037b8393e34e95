//! User directory collaborator.
//!
//! The credential core never stores users. Login and refresh go through the
//! [`UserDirectory`] trait; production deployments plug a database-backed
//! implementation in, the binary and tests use [`InMemoryUserDirectory`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use pvara_core::{DomainError, OrganizationId, SubjectId};

use crate::password::{self, PasswordError};
use crate::{Identity, Role};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error("user directory backend error: {0}")]
    Backend(String),
}

/// Stored user as the directory sees it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identity: Identity,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Active user by email. Unknown and inactive users both yield `None`.
    async fn find_active_user(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError>;

    /// Active user by subject id. Unknown and inactive users both yield `None`.
    async fn find_active_user_by_id(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Note a successful login. Callers treat failures as best-effort.
    async fn record_last_authenticated(
        &self,
        subject_id: &SubjectId,
        at: DateTime<Utc>,
    ) -> Result<(), DirectoryError>;
}

/// Seed entry for [`InMemoryUserDirectory::from_seed`].
///
/// Exactly one of `password` (hashed on load) or `password_hash` (PHC string)
/// must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub organization_id: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl SeedUser {
    pub fn into_record(self) -> Result<UserRecord, SeedError> {
        let password_hash = match (self.password, self.password_hash) {
            (Some(plain), None) => password::hash_password(&plain)?,
            (None, Some(hash)) => hash,
            _ => {
                return Err(DomainError::validation(format!(
                    "seed user {}: exactly one of password / password_hash is required",
                    self.id
                ))
                .into());
            }
        };

        Ok(UserRecord {
            identity: Identity::new(
                SubjectId::parse(self.id)?,
                self.email,
                Role::parse(&self.role),
                OrganizationId::parse(self.organization_id)?,
            ),
            password_hash,
            is_active: self.is_active,
            last_login_at: None,
        })
    }
}

/// Directory backed by a map; emails are matched case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<SubjectId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = records
            .into_iter()
            .map(|r| (r.identity.subject_id.clone(), r))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn from_seed(seed: Vec<SeedUser>) -> Result<Self, SeedError> {
        let records = seed
            .into_iter()
            .map(SeedUser::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_users(records))
    }

    pub async fn insert(&self, record: UserRecord) {
        self.users
            .write()
            .await
            .insert(record.identity.subject_id.clone(), record);
    }

    /// Raw lookup, active or not.
    pub async fn get(&self, subject_id: &SubjectId) -> Option<UserRecord> {
        self.users.read().await.get(subject_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_active_user(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|r| r.is_active && r.identity.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_active_user_by_id(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.get(subject_id).filter(|r| r.is_active).cloned())
    }

    async fn record_last_authenticated(
        &self,
        subject_id: &SubjectId,
        at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(subject_id) {
            Some(record) => {
                record.last_login_at = Some(at);
                Ok(())
            }
            None => Err(DirectoryError::Backend(format!("no user {subject_id}"))),
        }
    }
}
