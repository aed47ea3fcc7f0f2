use thiserror::Error;

use iamflow_core::TenantId;

use crate::identity::IdentityContext;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing authority '{0}'")]
    Forbidden(String),
}

/// The caller must carry a verified identity.
pub fn require_identity(identity: Option<&IdentityContext>) -> Result<&IdentityContext, AuthzError> {
    identity.ok_or(AuthzError::Unauthenticated)
}

/// A tenant-scoped resource may only be touched by principals of that tenant.
///
/// Root principals are bound to their owning tenant like everyone else.
///
/// - No IO
/// - No panics
pub fn authorize_tenant(identity: &IdentityContext, tenant_id: TenantId) -> Result<(), AuthzError> {
    if identity.tenant_id == Some(tenant_id) {
        Ok(())
    } else {
        Err(AuthzError::TenantMismatch)
    }
}

/// The caller must hold `authority` (e.g. `ROLE_ROOT` or a permission name).
pub fn require_authority(identity: &IdentityContext, authority: &str) -> Result<(), AuthzError> {
    if identity.has_authority(authority) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(authority.to_string()))
    }
}
