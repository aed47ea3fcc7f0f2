//! `iamflow-core`: identifiers and error primitives shared by every crate.
//!
//! This crate contains no I/O and no policy.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Identifiable;
pub use error::{PreconditionViolation, StoreError, StoreResult, require_non_blank};
pub use id::{PermissionId, PrincipalId, RoleId, TenantId};
