use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iamflow_core::{Identifiable, PrincipalId, TenantId};

use crate::{Authority, Role, resolve_authorities};

/// How a principal proves its identity at login.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    /// Email + password; a password hash is stored.
    #[default]
    Password,
    /// Identity asserted by an external identity provider; no password.
    Sso,
}

/// Lifecycle status of a principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalStatus {
    /// Created but email ownership not yet verified via OTP.
    #[default]
    Created,
    Active,
    Inactive,
}

/// Salted PHC-format password hash as stored by the credential store.
///
/// `Debug` is redacted so the hash never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// A principal as known to the credential store.
///
/// # Invariants
/// - `is_root` implies `tenant_id` is the owning tenant of the root account and
///   `roles` contains the ROOT role.
/// - A non-root principal's `tenant_id` equals the tenant it authenticated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub tenant_id: Option<TenantId>,
    pub email: String,
    pub password_hash: Option<HashedPassword>,
    pub roles: Vec<Role>,
    pub is_root: bool,
    #[serde(default)]
    pub auth_type: AuthenticationType,
    #[serde(default)]
    pub status: PrincipalStatus,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn has_root_role(&self) -> bool {
        self.roles.iter().any(Role::is_root)
    }
}

impl Identifiable for Principal {
    fn entity_id(&self) -> Option<i64> {
        Some(self.id.get())
    }
}

/// Outcome of a successful authentication: the authoritative principal plus
/// the authorities resolved from its *current* roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,
    pub authorities: BTreeSet<Authority>,
}

impl AuthenticatedPrincipal {
    pub fn new(principal: Principal) -> Self {
        let authorities = resolve_authorities(&principal.roles);
        Self {
            principal,
            authorities,
        }
    }

    pub fn id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn email(&self) -> &str {
        &self.principal.email
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.principal.tenant_id
    }

    pub fn is_root(&self) -> bool {
        self.principal.is_root
    }
}

impl Identifiable for AuthenticatedPrincipal {
    fn entity_id(&self) -> Option<i64> {
        Some(self.principal.id.get())
    }
}
