use serde::{Deserialize, Serialize};

use iamflow_core::{RoleId, TenantId};

use crate::Permission;

/// Name of the implicit role created once per tenant for its root principal.
pub const ROOT_ROLE: &str = "ROOT";

/// Role definition with the permissions it grants.
///
/// Roles are tenant-scoped; the ROOT role is the only one created implicitly
/// (at tenant creation) rather than through role management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>, tenant_id: Option<TenantId>) -> Self {
        Self {
            id,
            name: name.into(),
            tenant_id,
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    /// Root detection is a case-insensitive name match.
    pub fn is_root(&self) -> bool {
        self.name.eq_ignore_ascii_case(ROOT_ROLE)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_role_matches_case_insensitively() {
        assert!(Role::new(RoleId::new(1), "root", None).is_root());
        assert!(Role::new(RoleId::new(1), "ROOT", None).is_root());
        assert!(!Role::new(RoleId::new(2), "rooted", None).is_root());
    }
}
