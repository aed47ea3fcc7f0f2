//! Error boundary: every failure leaves the service as the same JSON shape.
//!
//! `{"error": code, "message": msg, "path": path, "timestamp": rfc3339}`

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use iamflow_auth::{AuthError, AuthErrorKind, AuthzError};
use iamflow_core::{PreconditionViolation, StoreError};
use iamflow_otp::OtpError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

impl From<PreconditionViolation> for ApiError {
    fn from(e: PreconditionViolation) -> Self {
        ApiError::Auth(e.into())
    }
}

impl ApiError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(e) => match e.kind() {
                AuthErrorKind::PreconditionViolation => {
                    (StatusCode::PRECONDITION_FAILED, "precondition_failed", e.to_string())
                }
                AuthErrorKind::NotFound | AuthErrorKind::BadCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "authentication_failed",
                    e.public_message().to_string(),
                ),
                AuthErrorKind::TokenInvalid => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_token",
                    e.public_message().to_string(),
                ),
                AuthErrorKind::TokenIssuanceFailed => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "token_issuance_failed",
                    e.public_message().to_string(),
                ),
                AuthErrorKind::Internal => internal(),
            },
            ApiError::Authz(e) => match e {
                AuthzError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "unauthenticated", e.to_string())
                }
                AuthzError::TenantMismatch => {
                    (StatusCode::FORBIDDEN, "tenant_mismatch", "access to this tenant is not allowed".to_string())
                }
                AuthzError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", e.to_string()),
            },
            ApiError::Otp(OtpError::PreconditionViolation(e)) => {
                (StatusCode::PRECONDITION_FAILED, "precondition_failed", e.to_string())
            }
            ApiError::Otp(OtpError::Store(_)) | ApiError::Store(_) => internal(),
            ApiError::InvalidBody(rejection) => {
                (rejection.status(), "invalid_request", rejection.body_text())
            }
        }
    }

    /// Render this error for the request at `path`.
    ///
    /// Internal details are logged here and never returned.
    pub fn into_response_at(self, path: &str) -> axum::response::Response {
        let (status, code, message) = self.status_code_message();
        if status.is_server_error() {
            error!(%path, error = %self, "request failed");
        } else {
            warn!(%path, code, "request rejected");
        }
        json_error(status, code, message, path)
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal error".to_string(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    path: &str,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
            "path": path,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(e: impl Into<ApiError>) -> (StatusCode, &'static str, String) {
        e.into().status_code_message()
    }

    #[test]
    fn credential_failures_look_identical() {
        let not_found = status_and_code(AuthError::NotFound);
        let bad = status_and_code(AuthError::BadCredentials);
        let not_root = status_and_code(AuthError::NotARoot);
        let inactive = status_and_code(AuthError::Inactive);
        assert_eq!(not_found, bad);
        assert_eq!(bad, not_root);
        assert_eq!(bad, inactive);
        assert_eq!(not_found.0, StatusCode::UNAUTHORIZED);
        assert_eq!(not_found.2, "invalid credentials");
    }

    #[test]
    fn mapping_table() {
        assert_eq!(
            status_and_code(AuthError::PreconditionViolation("email".into())).0,
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            status_and_code(AuthError::token_invalid("bad sig")).1,
            "invalid_token"
        );
        assert_eq!(
            status_and_code(AuthError::TokenIssuanceFailed("no key".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_and_code(AuthzError::TenantMismatch).0, StatusCode::FORBIDDEN);
        assert_eq!(status_and_code(AuthzError::Unauthenticated).0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_details_are_hidden() {
        let (status, code, message) = status_and_code(StoreError::unavailable("db at 10.0.0.3 refused"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "internal_error");
        assert!(!message.contains("10.0.0.3"));

        let (_, _, message) = status_and_code(AuthError::Crypto("phc parse".into()));
        assert!(!message.contains("phc"));
    }
}
