//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Identities and claims are snapshots: they are cloned between components and
/// compared field by field, never shared mutably. Implementors must be
/// `Send + Sync` so a snapshot can move to whichever task handles a request.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug + Send + Sync {}
