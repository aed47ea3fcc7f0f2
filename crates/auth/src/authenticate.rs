//! Principal authentication with explicit root/tenant dispatch.
//!
//! Each authenticator declares the credential variant it handles; the router
//! matches on the `Credentials` tag once and calls the right one. Neither
//! authenticator has side effects; recording login time is the caller's job.

use std::sync::OnceLock;

use tracing::{debug, warn};

use iamflow_core::require_non_blank;

use crate::credentials::{CredentialKind, Credentials, Proof, RootCredentials, TenantCredentials};
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::principal::{
    AuthenticatedPrincipal, AuthenticationType, HashedPassword, Principal, PrincipalStatus,
};
use crate::store::CredentialStore;

/// One authentication path.
pub trait PrincipalAuthenticator: Send + Sync {
    /// The credential variant this authenticator accepts.
    const KIND: CredentialKind;

    type Credentials;

    fn authenticate(&self, credentials: &Self::Credentials)
    -> Result<AuthenticatedPrincipal, AuthError>;
}

/// Authenticates the per-tenant root principal, looked up by email alone.
#[derive(Debug, Clone)]
pub struct RootAuthenticator<S> {
    store: S,
}

impl<S: CredentialStore> RootAuthenticator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: CredentialStore> PrincipalAuthenticator for RootAuthenticator<S> {
    const KIND: CredentialKind = CredentialKind::Root;

    type Credentials = RootCredentials;

    fn authenticate(
        &self,
        credentials: &RootCredentials,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let email = require_non_blank("email", &credentials.email)?;

        let Some(mut principal) = self.store.find_root_by_email(email)? else {
            warn!("root authentication failed: principal not found");
            spend_verify_time(&credentials.proof);
            return Err(AuthError::NotFound);
        };

        if !principal.has_root_role() {
            warn!(principal_id = %principal.id, "root authentication failed: principal lacks ROOT role");
            spend_verify_time(&credentials.proof);
            return Err(AuthError::NotARoot);
        }

        verify_proof(&principal, &credentials.proof)?;
        require_usable(&principal)?;

        principal.is_root = true;
        debug!(principal_id = %principal.id, "root principal authenticated");
        Ok(AuthenticatedPrincipal::new(principal))
    }
}

/// Authenticates tenant-scoped principals, looked up by (tenant, email).
#[derive(Debug, Clone)]
pub struct TenantAuthenticator<S> {
    store: S,
}

impl<S: CredentialStore> TenantAuthenticator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: CredentialStore> PrincipalAuthenticator for TenantAuthenticator<S> {
    const KIND: CredentialKind = CredentialKind::Tenant;

    type Credentials = TenantCredentials;

    fn authenticate(
        &self,
        credentials: &TenantCredentials,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let email = require_non_blank("email", &credentials.email)?;
        let tenant_id = credentials.tenant_id;

        let Some(mut principal) = self.store.find_by_tenant_and_email(tenant_id, email)? else {
            warn!(%tenant_id, "tenant authentication failed: principal not found");
            spend_verify_time(&credentials.proof);
            return Err(AuthError::NotFound);
        };

        // A store that hands back a principal from another tenant must not
        // turn into a cross-tenant login.
        if principal.tenant_id != Some(tenant_id) {
            warn!(%tenant_id, principal_id = %principal.id, "tenant authentication failed: tenant mismatch");
            spend_verify_time(&credentials.proof);
            return Err(AuthError::NotFound);
        }

        verify_proof(&principal, &credentials.proof)?;
        require_usable(&principal)?;

        principal.is_root = false;
        debug!(%tenant_id, principal_id = %principal.id, "tenant principal authenticated");
        Ok(AuthenticatedPrincipal::new(principal))
    }
}

/// Routes a `Credentials` value to the authenticator for its variant.
#[derive(Debug, Clone)]
pub struct AuthenticatorRouter<S> {
    root: RootAuthenticator<S>,
    tenant: TenantAuthenticator<S>,
}

impl<S: CredentialStore + Clone> AuthenticatorRouter<S> {
    pub fn new(store: S) -> Self {
        Self {
            root: RootAuthenticator::new(store.clone()),
            tenant: TenantAuthenticator::new(store),
        }
    }
}

impl<S: CredentialStore> AuthenticatorRouter<S> {
    pub fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        match credentials {
            Credentials::Root(c) => {
                debug_assert_eq!(RootAuthenticator::<S>::KIND, credentials.kind());
                self.root.authenticate(c)
            }
            Credentials::Tenant(c) => {
                debug_assert_eq!(TenantAuthenticator::<S>::KIND, credentials.kind());
                self.tenant.authenticate(c)
            }
        }
    }
}

/// Check the presented proof against the stored principal.
///
/// - `Password`: Argon2 verification; a principal without a stored hash can
///   never match.
/// - `Session`: the caller already verified a signed session token.
/// - `External`: only for principals declared as SSO.
fn verify_proof(principal: &Principal, proof: &Proof) -> Result<(), AuthError> {
    match proof {
        Proof::Password(password) => {
            let Some(hash) = principal.password_hash.as_ref() else {
                warn!(principal_id = %principal.id, "password presented for principal without a password");
                spend_verify_time(proof);
                return Err(AuthError::BadCredentials);
            };
            if verify_password(password, hash)? {
                Ok(())
            } else {
                warn!(principal_id = %principal.id, "authentication failed: password mismatch");
                Err(AuthError::BadCredentials)
            }
        }
        Proof::Session => Ok(()),
        Proof::External => match principal.auth_type {
            AuthenticationType::Sso => Ok(()),
            AuthenticationType::Password => {
                warn!(principal_id = %principal.id, "password-less login refused for password principal");
                Err(AuthError::BadCredentials)
            }
        },
    }
}

/// Deactivated principals cannot log in and their sessions stop binding.
fn require_usable(principal: &Principal) -> Result<(), AuthError> {
    if principal.status == PrincipalStatus::Inactive {
        warn!(principal_id = %principal.id, "authentication refused: principal is inactive");
        return Err(AuthError::Inactive);
    }
    Ok(())
}

/// Run one Argon2 verification against a fixed hash so that a miss costs
/// about as much as a password mismatch.
fn spend_verify_time(proof: &Proof) {
    static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();

    let Proof::Password(password) = proof else {
        return;
    };
    if let Some(hash) = DUMMY.get_or_init(|| hash_password("iamflow-unmatched").ok()) {
        let _ = verify_password(password, hash);
    }
}
