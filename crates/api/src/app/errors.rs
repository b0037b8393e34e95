use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pvara_auth::AuthError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// The single answer for any rejected credential.
pub fn unauthorized() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
}

/// Map login / refresh failures. Internal detail is logged, never returned.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::AuthenticationFailed => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials")
        }
        AuthError::Credential(failure) => {
            tracing::debug!(reason = %failure, "credential rejected");
            unauthorized()
        }
        AuthError::Directory(e) => {
            tracing::error!(error = %e, "user directory failure");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "authentication is temporarily unavailable",
            )
        }
        AuthError::Signing(e) => {
            tracing::error!(error = %e, "credential signing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        AuthError::Password(e) => {
            tracing::error!(error = %e, "password check failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}
