//! `pvara-auth` — session credential core.
//!
//! Issues and verifies HS256-signed access / renewal credentials bound to a
//! user, role and organization. Issuance and verification are synchronous,
//! pure and lock-free over one immutable [`SigningContext`]. The login and
//! renewal flows in [`session`] sit on top and talk to an external
//! [`directory::UserDirectory`]; this crate is decoupled from HTTP.

pub mod authorize;
pub mod claims;
pub mod directory;
pub mod error;
pub mod identity;
pub mod issuer;
pub mod password;
pub mod roles;
pub mod session;
pub mod signing;
pub mod verifier;

pub use authorize::{AuthzError, Principal, authorize_org, require_role};
pub use claims::{Claims, CredentialKind, ISSUER};
pub use directory::{DirectoryError, InMemoryUserDirectory, SeedError, SeedUser, UserDirectory, UserRecord};
pub use error::{SigningError, VerificationFailure};
pub use identity::Identity;
pub use issuer::{Credential, CredentialIssuer};
pub use roles::Role;
pub use session::{AuthError, AuthService, IssuedCredentials, UserSummary};
pub use signing::SigningContext;
pub use verifier::CredentialVerifier;
