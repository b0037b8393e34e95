//! `pvara-core` — domain primitives shared by the credential service.
//!
//! This crate contains **pure domain** types (no crypto, no IO, no transport).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{OrganizationId, SubjectId};
pub use value_object::ValueObject;
