use serde::{Deserialize, Serialize};

use iamflow_core::PermissionId;

/// Action a permission grants over its resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionAction {
    Create,
    Read,
    Update,
    Delete,
}

impl core::fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            PermissionAction::Create => "CREATE",
            PermissionAction::Read => "READ",
            PermissionAction::Update => "UPDATE",
            PermissionAction::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Permission from the global catalog.
///
/// Permissions are immutable once created and are referenced by roles; the
/// `name` is what surfaces as an authority (e.g. "user.read").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub action: PermissionAction,
}

impl Permission {
    pub fn new(id: PermissionId, name: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            id,
            name: name.into(),
            action,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
