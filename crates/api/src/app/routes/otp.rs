use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use iamflow_auth::RequestContext;

use crate::app::dto::{OtpResendRequest, OtpValidateRequest, OtpValidateResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn validate(
    State(services): State<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<OtpValidateRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return ApiError::from(e).into_response_at(&ctx.path),
    };
    match services.validate_otp(body.tenant_id, &body.email, &body.otp) {
        Ok(status) => (StatusCode::OK, Json(OtpValidateResponse { status })).into_response(),
        Err(e) => e.into_response_at(&ctx.path),
    }
}

pub async fn resend(
    State(services): State<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<OtpResendRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return ApiError::from(e).into_response_at(&ctx.path),
    };
    match services.resend_otp(body.tenant_id, &body.email, body.is_root) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response_at(&ctx.path),
    }
}
