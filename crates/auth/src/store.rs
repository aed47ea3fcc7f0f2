use std::sync::Arc;

use chrono::{DateTime, Utc};

use iamflow_core::{PrincipalId, StoreResult, TenantId};

use crate::Principal;

/// Principal lookup and the few named writes the engine needs.
///
/// Lookups return `Ok(None)` for a missing principal; `Err` is reserved for
/// the store itself failing.
pub trait CredentialStore: Send + Sync {
    fn find_by_tenant_and_email(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> StoreResult<Option<Principal>>;

    /// Root principals are looked up without a tenant key.
    fn find_root_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;

    /// Rotate login timestamps after a successful login.
    fn record_login(&self, principal_id: PrincipalId, at: DateTime<Utc>) -> StoreResult<()>;

    /// Mark a principal active once its email has been verified.
    ///
    /// `tenant_id` is `None` for root principals.
    fn activate(&self, tenant_id: Option<TenantId>, email: &str) -> StoreResult<bool>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn find_by_tenant_and_email(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> StoreResult<Option<Principal>> {
        (**self).find_by_tenant_and_email(tenant_id, email)
    }

    fn find_root_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        (**self).find_root_by_email(email)
    }

    fn record_login(&self, principal_id: PrincipalId, at: DateTime<Utc>) -> StoreResult<()> {
        (**self).record_login(principal_id, at)
    }

    fn activate(&self, tenant_id: Option<TenantId>, email: &str) -> StoreResult<bool> {
        (**self).activate(tenant_id, email)
    }
}
