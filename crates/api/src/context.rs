use pvara_auth::{Claims, Principal};

/// Authenticated caller for a request, inserted by the auth middleware.
///
/// Only ever built from a verified access credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    claims: Claims,
}

impl PrincipalContext {
    pub fn new(principal: Principal, claims: Claims) -> Self {
        Self { principal, claims }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
