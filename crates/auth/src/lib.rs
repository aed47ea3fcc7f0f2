//! `iamflow-auth`: authentication, authority resolution and session tokens.
//!
//! This crate is decoupled from HTTP and storage; persistence comes in through
//! [`CredentialStore`].

pub mod authenticate;
pub mod authority;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod store;
pub mod token;

pub use authenticate::{
    AuthenticatorRouter, PrincipalAuthenticator, RootAuthenticator, TenantAuthenticator,
};
pub use authority::{Authority, ROLE_PREFIX, resolve_authorities};
pub use authorize::{AuthzError, authorize_tenant, require_authority, require_identity};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialKind, Credentials, Proof, RootCredentials, TenantCredentials};
pub use error::{AuthError, AuthErrorKind, GENERIC_CREDENTIALS_MESSAGE};
pub use identity::{ClientInfo, IdentityBinder, IdentityContext, RequestContext};
pub use password::{hash_password, verify_password};
pub use permissions::{Permission, PermissionAction};
pub use principal::{
    AuthenticatedPrincipal, AuthenticationType, HashedPassword, Principal, PrincipalStatus,
};
pub use roles::{ROOT_ROLE, Role};
pub use store::CredentialStore;
pub use token::{DEFAULT_SESSION_TTL_SECS, TokenCodec};
