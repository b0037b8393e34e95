//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP handlers (auth flows, system endpoints)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use pvara_auth::AuthService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(auth: Arc<AuthService>) -> Router {
    let auth_state = middleware::AuthState { auth: auth.clone() };

    // Protected routes: require a valid access credential.
    let protected = routes::auth::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::public_router().merge(protected))
        .layer(ServiceBuilder::new().layer(Extension(auth)))
}
