use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iamflow_auth::SessionClaims;
use iamflow_core::TenantId;
use iamflow_otp::OtpValidationStatus;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub tenant_id: TenantId,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RootLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpValidateRequest {
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResendRequest {
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    pub email: String,
    #[serde(default)]
    pub is_root: bool,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub email: String,
    pub is_root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    pub fn new(token: String, claims: SessionClaims) -> Self {
        Self {
            token,
            token_type: "Bearer",
            email: claims.email,
            is_root: claims.is_root,
            tenant_id: claims.tenant_id,
            expires_at: claims.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OtpValidateResponse {
    pub status: OtpValidationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoritiesResponse {
    pub tenant_id: TenantId,
    pub authorities: Vec<String>,
}
