use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use iamflow_auth::{CredentialStore, Principal, PrincipalStatus};
use iamflow_core::{PrincipalId, StoreError, StoreResult, TenantId};

/// Principals keyed by id; emails match case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a principal. Fails if the id is taken or the (tenant, email) pair
    /// already exists.
    pub fn insert(&self, principal: Principal) -> StoreResult<()> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&principal.id) {
            return Err(StoreError::conflict(format!("principal {} exists", principal.id)));
        }
        let duplicate = map.values().any(|p| {
            p.tenant_id == principal.tenant_id && p.email.eq_ignore_ascii_case(&principal.email)
        });
        if duplicate {
            return Err(StoreError::conflict("email already registered in tenant"));
        }
        map.insert(principal.id, principal);
        Ok(())
    }

    pub fn get(&self, id: PrincipalId) -> Option<Principal> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&id).cloned()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_tenant_and_email(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> StoreResult<Option<Principal>> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .values()
            .find(|p| p.tenant_id == Some(tenant_id) && p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn find_root_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .values()
            .find(|p| p.is_root && p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn record_login(&self, principal_id: PrincipalId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(p) = map.get_mut(&principal_id) {
            p.last_login_at = Some(at);
        }
        Ok(())
    }

    fn activate(&self, tenant_id: Option<TenantId>, email: &str) -> StoreResult<bool> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let target = map.values_mut().find(|p| {
            let scope = match tenant_id {
                Some(t) => !p.is_root && p.tenant_id == Some(t),
                None => p.is_root,
            };
            scope && p.email.eq_ignore_ascii_case(email)
        });

        Ok(match target {
            Some(p) => {
                p.status = PrincipalStatus::Active;
                debug!(principal_id = %p.id, "principal activated");
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iamflow_auth::AuthenticationType;

    fn principal(id: i64, tenant: i64, email: &str, is_root: bool) -> Principal {
        Principal {
            id: PrincipalId::new(id),
            tenant_id: Some(TenantId::new(tenant)),
            email: email.to_string(),
            password_hash: None,
            roles: vec![],
            is_root,
            auth_type: AuthenticationType::Password,
            status: PrincipalStatus::Created,
            last_login_at: None,
        }
    }

    #[test]
    fn lookups_are_tenant_scoped() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, 42, "a@x.com", false)).unwrap();
        store.insert(principal(2, 43, "a@x.com", false)).unwrap();

        let found = store.find_by_tenant_and_email(TenantId::new(43), "A@x.com").unwrap().unwrap();
        assert_eq!(found.id, PrincipalId::new(2));
        assert!(store.find_by_tenant_and_email(TenantId::new(44), "a@x.com").unwrap().is_none());
        assert!(store.find_root_by_email("a@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_in_tenant_conflicts() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, 42, "a@x.com", false)).unwrap();
        assert!(matches!(
            store.insert(principal(2, 42, "a@x.com", false)),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn record_login_and_activate() {
        let store = InMemoryCredentialStore::new();
        store.insert(principal(1, 42, "root@x.com", true)).unwrap();
        store.insert(principal(2, 42, "a@x.com", false)).unwrap();

        let at = Utc::now();
        store.record_login(PrincipalId::new(2), at).unwrap();
        assert_eq!(store.get(PrincipalId::new(2)).unwrap().last_login_at, Some(at));

        assert!(store.activate(None, "root@x.com").unwrap());
        assert!(!store.activate(None, "a@x.com").unwrap());
        assert!(store.activate(Some(TenantId::new(42)), "a@x.com").unwrap());
        assert_eq!(store.get(PrincipalId::new(1)).unwrap().status, PrincipalStatus::Active);
        assert_eq!(store.get(PrincipalId::new(2)).unwrap().status, PrincipalStatus::Active);
    }
}
