use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use pvara_auth::AuthService;

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Endpoints reachable without a credential.
pub fn public_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Endpoints behind the access-credential middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}

pub async fn login(
    Extension(auth): Extension<Arc<AuthService>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text());
        }
    };
    if let Err(msg) = body.validate() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg);
    }

    match auth.login(body.email.trim(), &body.password).await {
        Ok(issued) => (StatusCode::OK, Json(issued)).into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

pub async fn refresh(
    Extension(auth): Extension<Arc<AuthService>>,
    body: Result<Json<dto::RefreshRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text());
        }
    };

    match auth.refresh(&body.refresh_token).await {
        Ok(issued) => (StatusCode::OK, Json(issued)).into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

pub async fn me(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(dto::MeResponse::from(principal.claims()))
}

/// Credentials are stateless; logging out is the client discarding them.
pub async fn logout(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    tracing::info!(subject_id = %principal.principal().subject_id, "logout");
    Json(serde_json::json!({ "message": "logged out" }))
}
