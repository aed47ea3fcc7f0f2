//! Authentication error model.

use thiserror::Error;

use iamflow_core::{PreconditionViolation, StoreError};

/// Message shown to callers for every credential failure, regardless of which
/// sub-check failed.
pub const GENERIC_CREDENTIALS_MESSAGE: &str = "invalid credentials";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("principal not found")]
    NotFound,

    #[error("bad credentials")]
    BadCredentials,

    #[error("principal is not a root principal")]
    NotARoot,

    #[error("principal is inactive")]
    Inactive,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification used by the request boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    PreconditionViolation,
    NotFound,
    BadCredentials,
    TokenInvalid,
    TokenIssuanceFailed,
    Internal,
}

impl AuthError {
    pub fn token_invalid(msg: impl Into<String>) -> Self {
        Self::TokenInvalid(msg.into())
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::PreconditionViolation(_) => AuthErrorKind::PreconditionViolation,
            AuthError::NotFound => AuthErrorKind::NotFound,
            AuthError::BadCredentials | AuthError::NotARoot | AuthError::Inactive => {
                AuthErrorKind::BadCredentials
            }
            AuthError::TokenInvalid(_) => AuthErrorKind::TokenInvalid,
            AuthError::TokenIssuanceFailed(_) => AuthErrorKind::TokenIssuanceFailed,
            AuthError::Crypto(_) | AuthError::Store(_) => AuthErrorKind::Internal,
        }
    }

    /// Message safe to return to an unauthenticated caller.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            AuthErrorKind::NotFound | AuthErrorKind::BadCredentials => GENERIC_CREDENTIALS_MESSAGE,
            AuthErrorKind::PreconditionViolation => "required input is missing",
            AuthErrorKind::TokenInvalid => "invalid authentication token",
            AuthErrorKind::TokenIssuanceFailed => "authentication token generation failed",
            AuthErrorKind::Internal => "internal error",
        }
    }
}

impl From<PreconditionViolation> for AuthError {
    fn from(value: PreconditionViolation) -> Self {
        Self::PreconditionViolation(value.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_public_message() {
        let messages: Vec<&str> = [
            AuthError::NotFound,
            AuthError::BadCredentials,
            AuthError::NotARoot,
            AuthError::Inactive,
        ]
            .iter()
            .map(AuthError::public_message)
            .collect();
        assert!(messages.iter().all(|m| *m == GENERIC_CREDENTIALS_MESSAGE));
    }

    #[test]
    fn root_mismatch_is_classified_as_bad_credentials() {
        assert_eq!(AuthError::NotARoot.kind(), AuthErrorKind::BadCredentials);
        assert_ne!(AuthError::NotARoot, AuthError::BadCredentials);
    }

    #[test]
    fn store_failures_are_internal() {
        let err: AuthError = StoreError::unavailable("db down").into();
        assert_eq!(err.kind(), AuthErrorKind::Internal);
        assert_eq!(err.public_message(), "internal error");
    }
}
