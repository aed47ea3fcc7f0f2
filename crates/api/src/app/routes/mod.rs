use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app::services::AppServices;

pub mod accounts;
pub mod auth;
pub mod otp;
pub mod system;

/// Router for everything under `/api/v1`.
pub fn router() -> Router<Arc<AppServices>> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/root-login", post(auth::root_login))
        .route("/auth/whoami", get(auth::whoami))
        .route("/otp/validate", post(otp::validate))
        .route("/otp/resend", post(otp::resend))
        .route("/accounts/:tenant_id/authorities", get(accounts::authorities))
}
