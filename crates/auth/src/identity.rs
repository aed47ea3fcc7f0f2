//! Per-request identity.
//!
//! A bearer token is decoded, the principal is re-loaded by its identity and
//! authorities are resolved from the current roles. The result lives only for
//! the duration of one request.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use iamflow_core::{PrincipalId, TenantId};

use crate::authenticate::AuthenticatorRouter;
use crate::authority::Authority;
use crate::credentials::{Credentials, Proof};
use crate::error::AuthError;
use crate::principal::AuthenticatedPrincipal;
use crate::store::CredentialStore;
use crate::token::TokenCodec;

/// The verified identity attached to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContext {
    pub principal_id: PrincipalId,
    pub email: String,
    pub tenant_id: Option<TenantId>,
    pub is_root: bool,
    pub authorities: BTreeSet<Authority>,
}

impl IdentityContext {
    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == name)
    }
}

impl From<&AuthenticatedPrincipal> for IdentityContext {
    fn from(p: &AuthenticatedPrincipal) -> Self {
        Self {
            principal_id: p.id(),
            email: p.email().to_string(),
            tenant_id: p.tenant_id(),
            is_root: p.is_root(),
            authorities: p.authorities.clone(),
        }
    }
}

/// Network details of the caller, as far as they can be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Everything the engine knows about the request being served.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Option<IdentityContext>,
    pub client: ClientInfo,
    pub path: String,
}

impl RequestContext {
    pub fn anonymous(path: impl Into<String>, client: ClientInfo) -> Self {
        Self {
            identity: None,
            client,
            path: path.into(),
        }
    }

    pub fn with_identity(mut self, identity: IdentityContext) -> Self {
        self.identity = Some(identity);
        self
    }

    /// `email` of the identified caller, if any.
    pub fn actor(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.email.as_str())
    }
}

/// Turns a bearer token into an [`IdentityContext`].
#[derive(Debug, Clone)]
pub struct IdentityBinder<S> {
    codec: TokenCodec,
    router: AuthenticatorRouter<S>,
}

impl<S: CredentialStore + Clone> IdentityBinder<S> {
    pub fn new(codec: TokenCodec, store: S) -> Self {
        Self {
            codec,
            router: AuthenticatorRouter::new(store),
        }
    }

    /// Verify `token` and re-authenticate the principal it names.
    ///
    /// The signature already proves identity, so the password check is
    /// skipped; the lookup still has to succeed.
    pub fn bind(&self, token: &str) -> Result<IdentityContext, AuthError> {
        let claims = self.codec.decode(token)?;

        let credentials = match (claims.is_root, claims.tenant_id) {
            (true, _) => Credentials::root(claims.email, Proof::Session),
            (false, Some(tenant_id)) => Credentials::tenant(tenant_id, claims.email, Proof::Session),
            (false, None) => return Err(AuthError::token_invalid("tenant session without tenant id")),
        };

        let principal = self.router.authenticate(&credentials)?;
        debug!(principal_id = %principal.id(), "bound request identity");
        Ok(IdentityContext::from(&principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use chrono::{DateTime, Duration, Utc};
    use iamflow_core::{RoleId, StoreResult};

    use crate::principal::{AuthenticationType, Principal, PrincipalStatus};
    use crate::roles::Role;

    #[derive(Default)]
    struct Principals {
        by_key: RwLock<HashMap<(Option<i64>, String), Principal>>,
    }

    impl CredentialStore for Principals {
        fn find_by_tenant_and_email(&self, tenant_id: TenantId, email: &str) -> StoreResult<Option<Principal>> {
            let map = self.by_key.read().unwrap();
            Ok(map.get(&(Some(tenant_id.get()), email.to_string())).cloned())
        }

        fn find_root_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
            let map = self.by_key.read().unwrap();
            Ok(map.values().find(|p| p.is_root && p.email == email).cloned())
        }

        fn record_login(&self, _: PrincipalId, _: DateTime<Utc>) -> StoreResult<()> {
            Ok(())
        }

        fn activate(&self, _: Option<TenantId>, _: &str) -> StoreResult<bool> {
            Ok(false)
        }
    }

    fn principal(id: i64, tenant: i64, email: &str, roles: Vec<Role>, is_root: bool) -> Principal {
        Principal {
            id: PrincipalId::new(id),
            tenant_id: Some(TenantId::new(tenant)),
            email: email.to_string(),
            password_hash: None,
            roles,
            is_root,
            auth_type: AuthenticationType::Password,
            status: PrincipalStatus::Active,
            last_login_at: None,
        }
    }

    fn binder(store: Arc<Principals>) -> IdentityBinder<Arc<Principals>> {
        IdentityBinder::new(TokenCodec::with_default_ttl(b"binder-secret"), store)
    }

    fn token_for(p: &Principal) -> String {
        let auth = AuthenticatedPrincipal::new(p.clone());
        TokenCodec::with_default_ttl(b"binder-secret").issue(&auth).unwrap().0
    }

    #[test]
    fn binds_current_authorities_from_store() {
        let store = Arc::new(Principals::default());
        let mut p = principal(7, 42, "a@x.com", vec![Role::new(RoleId::new(1), "EDITOR", Some(TenantId::new(42)))], false);
        store.by_key.write().unwrap().insert((Some(42), "a@x.com".into()), p.clone());
        let token = token_for(&p);

        // Roles change after the token was issued.
        p.roles.push(Role::new(RoleId::new(2), "AUDITOR", Some(TenantId::new(42))));
        store.by_key.write().unwrap().insert((Some(42), "a@x.com".into()), p);

        let identity = binder(store).bind(&token).unwrap();
        assert_eq!(identity.tenant_id, Some(TenantId::new(42)));
        assert!(identity.has_authority("ROLE_EDITOR"));
        assert!(identity.has_authority("ROLE_AUDITOR"));
    }

    #[test]
    fn root_token_binds_root_identity() {
        let store = Arc::new(Principals::default());
        let p = principal(1, 42, "root@x.com", vec![Role::new(RoleId::new(9), "ROOT", Some(TenantId::new(42)))], true);
        store.by_key.write().unwrap().insert((None, "root@x.com".into()), p.clone());

        let identity = binder(store).bind(&token_for(&p)).unwrap();
        assert!(identity.is_root);
        assert!(identity.has_authority("ROLE_ROOT"));
    }

    #[test]
    fn deleted_principal_is_not_bound() {
        let store = Arc::new(Principals::default());
        let p = principal(7, 42, "gone@x.com", vec![], false);
        let token = token_for(&p);

        assert_eq!(binder(store).bind(&token), Err(AuthError::NotFound));
    }

    #[test]
    fn expired_token_is_rejected() {
        let store = Arc::new(Principals::default());
        let p = principal(7, 42, "a@x.com", vec![], false);
        store.by_key.write().unwrap().insert((Some(42), "a@x.com".into()), p.clone());

        let codec = TokenCodec::with_default_ttl(b"binder-secret");
        let auth = AuthenticatedPrincipal::new(p);
        let claims = codec.claims_for(&auth, Utc::now() - Duration::hours(2));
        let token = codec.encode(&claims).unwrap();

        assert!(matches!(binder(store).bind(&token), Err(AuthError::TokenInvalid(_))));
    }
}
