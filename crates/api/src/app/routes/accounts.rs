use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use iamflow_auth::RequestContext;
use iamflow_core::TenantId;

use crate::app::dto::AuthoritiesResponse;
use crate::app::errors::ApiError;
use crate::authz;

/// Authorities of the caller within their own tenant. Needs root or `user.read`.
pub async fn authorities(
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<i64>,
) -> axum::response::Response {
    let tenant_id = TenantId::new(tenant_id);
    match authz::tenant_reader(&ctx, tenant_id) {
        Ok(identity) => (
            StatusCode::OK,
            Json(AuthoritiesResponse {
                tenant_id,
                authorities: identity.authorities.iter().map(|a| a.to_string()).collect(),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response_at(&ctx.path),
    }
}
