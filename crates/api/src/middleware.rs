use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use pvara_auth::{AuthService, Principal, VerificationFailure};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
}

/// Require a valid access credential in `Authorization`.
///
/// Every failure produces the same generic 401; the reason only goes to the log.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let presented = authorization_header(req.headers()).ok_or_else(|| {
        tracing::debug!("missing authorization header");
        errors::unauthorized()
    })?;

    let claims = state
        .auth
        .verifier()
        .verify_access(presented)
        .map_err(|failure| {
            log_rejection(failure);
            errors::unauthorized()
        })?;

    let principal = Principal::try_from(&claims).map_err(|e| {
        tracing::warn!(error = %e, "verified credential has no principal");
        errors::unauthorized()
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, claims));

    Ok(next.run(req).await)
}

/// Raw header value; the verifier strips the `Bearer ` label itself.
fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn log_rejection(failure: VerificationFailure) {
    match failure {
        VerificationFailure::InvalidSignature => {
            tracing::warn!(reason = %failure, "access credential rejected")
        }
        _ => tracing::debug!(reason = %failure, "access credential rejected"),
    }
}
