//! Authentication requests.
//!
//! Exactly two variants exist; routing happens on the enum tag.

use iamflow_core::TenantId;

/// What the caller presents to prove who they are.
#[derive(Clone, PartialEq, Eq)]
pub enum Proof {
    /// Plaintext password supplied at login.
    Password(String),
    /// Identity already proven by a verified session token (re-authentication).
    Session,
    /// No secret presented; only accepted for principals whose identity is
    /// asserted by an external provider.
    External,
}

impl Proof {
    pub fn password(p: impl Into<String>) -> Self {
        Self::Password(p.into())
    }
}

impl core::fmt::Debug for Proof {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Proof::Password(_) => f.write_str("Password(<redacted>)"),
            Proof::Session => f.write_str("Session"),
            Proof::External => f.write_str("External"),
        }
    }
}

/// Root login: looked up by email alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCredentials {
    pub email: String,
    pub proof: Proof,
}

/// Tenant login: looked up by (tenant, email).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantCredentials {
    pub tenant_id: TenantId,
    pub email: String,
    pub proof: Proof,
}

/// Type tag of a credential variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Root,
    Tenant,
}

/// Closed set of authentication requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Root(RootCredentials),
    Tenant(TenantCredentials),
}

impl Credentials {
    pub fn root(email: impl Into<String>, proof: Proof) -> Self {
        Self::Root(RootCredentials {
            email: email.into(),
            proof,
        })
    }

    pub fn tenant(tenant_id: TenantId, email: impl Into<String>, proof: Proof) -> Self {
        Self::Tenant(TenantCredentials {
            tenant_id,
            email: email.into(),
            proof,
        })
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            Credentials::Root(_) => CredentialKind::Root,
            Credentials::Tenant(_) => CredentialKind::Tenant,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Credentials::Root(c) => &c.email,
            Credentials::Tenant(c) => &c.email,
        }
    }
}
