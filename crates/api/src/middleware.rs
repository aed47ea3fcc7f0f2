//! Request identity binder.
//!
//! Runs on every request. Allow-listed paths skip authentication; other
//! requests without an `Authorization` header continue anonymously and
//! handlers decide whether that is enough.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use iamflow_auth::{AuthError, RequestContext};

use crate::allowlist::AllowList;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::client_info;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
    pub allow_list: Arc<AllowList>,
}

pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ctx = RequestContext::anonymous(path.clone(), client_info(req.headers(), peer));

    if state.allow_list.is_public(&path) {
        debug!(%path, "public path, authentication skipped");
        req.extensions_mut().insert(ctx);
        return next.run(req).await;
    }

    let ctx = match extract_bearer(req.headers()) {
        Ok(None) => ctx,
        Ok(Some(token)) => match state.services.binder().bind(token) {
            Ok(identity) => {
                debug!(%path, principal_id = %identity.principal_id, "request authenticated");
                ctx.with_identity(identity)
            }
            Err(e) => return ApiError::from(e).into_response_at(&path),
        },
        Err(e) => return ApiError::from(e).into_response_at(&path),
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// `Ok(None)` when no `Authorization` header is present.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AuthError::token_invalid("authorization header is not valid ASCII"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::token_invalid("authorization scheme must be Bearer"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::token_invalid("empty bearer token"));
    }

    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static(value));
        h
    }

    #[test]
    fn absent_header_is_anonymous() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_trimmed() {
        assert_eq!(extract_bearer(&headers("Bearer   abc.def.ghi  ")), Ok(Some("abc.def.ghi")));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        assert!(matches!(
            extract_bearer(&headers("bearer abc")),
            Err(AuthError::TokenInvalid(_))
        ));
        assert!(matches!(
            extract_bearer(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(
            extract_bearer(&headers("Bearer    ")),
            Err(AuthError::TokenInvalid(_))
        ));
    }
}
