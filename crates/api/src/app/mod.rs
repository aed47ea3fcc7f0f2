//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: engine wiring and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: the error boundary

use std::sync::Arc;

use axum::{Router, routing::get};
use tower::ServiceBuilder;

use crate::allowlist::AllowList;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    build_app_with_allow_list(services, AllowList::default())
}

pub fn build_app_with_allow_list(services: Arc<AppServices>, allow_list: AllowList) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
        allow_list: Arc::new(allow_list),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", routes::router().with_state(services))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::identity_middleware,
        )))
}
