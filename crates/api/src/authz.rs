//! API-side authorization guards.
//!
//! Handlers call these before touching tenant-scoped data.

use iamflow_auth::{
    AuthzError, IdentityContext, RequestContext, authorize_tenant, require_authority,
    require_identity,
};
use iamflow_core::TenantId;

/// Authority of a tenant's root principal.
pub const ROOT_AUTHORITY: &str = "ROLE_ROOT";

/// Permission that allows reading principal data within a tenant.
pub const USER_READ: &str = "user.read";

/// The request must carry an identity.
pub fn authenticated(ctx: &RequestContext) -> Result<&IdentityContext, AuthzError> {
    require_identity(ctx.identity.as_ref())
}

/// The request must carry an identity that belongs to `tenant_id`.
pub fn tenant_member(ctx: &RequestContext, tenant_id: TenantId) -> Result<&IdentityContext, AuthzError> {
    let identity = authenticated(ctx)?;
    authorize_tenant(identity, tenant_id)?;
    Ok(identity)
}

/// Tenant member that is either the tenant root or holds `user.read`.
pub fn tenant_reader(ctx: &RequestContext, tenant_id: TenantId) -> Result<&IdentityContext, AuthzError> {
    let identity = tenant_member(ctx, tenant_id)?;
    require_authority(identity, ROOT_AUTHORITY).or_else(|_| require_authority(identity, USER_READ))?;
    Ok(identity)
}
