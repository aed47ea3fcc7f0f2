use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use iamflow_core::TenantId;

/// Session claims carried inside a signed token (transport-agnostic).
///
/// Only identity travels in the token. Authorities are resolved again on every
/// request from the current role state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,

    #[serde(rename = "isRoot")]
    pub is_root: bool,

    /// Tenant context; omitted for root sessions.
    #[serde(rename = "tenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("tenant session without tenant id")]
    MissingTenant,

    #[error("session without email")]
    MissingEmail,
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// the token codec before this is called.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    if claims.email.trim().is_empty() {
        return Err(TokenValidationError::MissingEmail);
    }
    if !claims.is_root && claims.tenant_id.is_none() {
        return Err(TokenValidationError::MissingTenant);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims_at(issued: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            email: "a@x.com".to_string(),
            is_root: false,
            tenant_id: Some(TenantId::new(42)),
            issued_at: issued,
            expires_at: issued + Duration::hours(1),
        }
    }

    #[test]
    fn valid_window_passes() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert!(validate_claims(&claims_at(issued), issued + Duration::minutes(5)).is_ok());
    }

    #[test]
    fn expiry_is_exclusive() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(issued);
        assert_eq!(
            validate_claims(&claims, claims.expires_at),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issue_time_is_rejected() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            validate_claims(&claims_at(issued), issued - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn tenant_session_needs_tenant_id() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let mut claims = claims_at(issued);
        claims.tenant_id = None;
        assert_eq!(
            validate_claims(&claims, issued),
            Err(TokenValidationError::MissingTenant)
        );
    }

    #[test]
    fn root_claims_omit_tenant_on_the_wire() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let mut claims = claims_at(issued);
        claims.is_root = true;
        claims.tenant_id = None;

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("tenantId").is_none());
        assert_eq!(json["isRoot"], true);
        assert_eq!(json["exp"].as_i64(), Some(claims.expires_at.timestamp()));
    }
}
