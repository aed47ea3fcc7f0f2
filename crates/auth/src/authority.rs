use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Prefix that marks a role-derived authority.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Capability token used for access decisions.
///
/// Either `ROLE_<roleName>` or a bare permission name. Authorities are derived
/// on every authentication and never stored or carried inside tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Authority granted by holding a role.
    pub fn for_role(role_name: &str) -> Self {
        Self(Cow::Owned(format!("{ROLE_PREFIX}{role_name}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the flat authority set for a role list.
///
/// - No IO
/// - Order independent, duplicate free
/// - Empty input yields an empty set
pub fn resolve_authorities(roles: &[Role]) -> BTreeSet<Authority> {
    roles
        .iter()
        .flat_map(|role| {
            std::iter::once(Authority::for_role(&role.name)).chain(
                role.permissions
                    .iter()
                    .map(|p| Authority::new(p.name.clone())),
            )
        })
        .collect()
}
