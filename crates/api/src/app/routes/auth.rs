use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use iamflow_auth::{Credentials, Proof, RequestContext};

use crate::app::dto::{LoginRequest, LoginResponse, RootLoginRequest};
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, IssuedSession};
use crate::authz;

pub async fn login(
    State(services): State<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return ApiError::from(e).into_response_at(&ctx.path),
    };
    let credentials = Credentials::tenant(body.tenant_id, body.email, Proof::password(body.password));
    respond_with_session(services.login(&ctx, &credentials), &ctx.path)
}

pub async fn root_login(
    State(services): State<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<RootLoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return ApiError::from(e).into_response_at(&ctx.path),
    };
    let credentials = Credentials::root(body.email, Proof::password(body.password));
    respond_with_session(services.login(&ctx, &credentials), &ctx.path)
}

pub async fn whoami(Extension(ctx): Extension<RequestContext>) -> axum::response::Response {
    match authz::authenticated(&ctx) {
        Ok(identity) => (StatusCode::OK, Json(identity.clone())).into_response(),
        Err(e) => ApiError::from(e).into_response_at(&ctx.path),
    }
}

/// 201 with the token in both the `Authorization` header and the body.
fn respond_with_session(
    result: Result<IssuedSession, ApiError>,
    path: &str,
) -> axum::response::Response {
    let session = match result {
        Ok(s) => s,
        Err(e) => return e.into_response_at(path),
    };

    let bearer = HeaderValue::from_str(&format!("Bearer {}", session.token));
    let body = Json(LoginResponse::new(session.token, session.claims));

    match bearer {
        Ok(value) => (StatusCode::CREATED, [(header::AUTHORIZATION, value)], body).into_response(),
        Err(_) => (StatusCode::CREATED, body).into_response(),
    }
}
