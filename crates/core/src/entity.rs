//! Identifiable trait: the explicit "has an id" contract used for audit
//! attribution.

/// A value that can name the entity it describes.
///
/// Implemented deliberately by the few result/argument types whose id should
/// appear in activity records.
pub trait Identifiable {
    /// Returns the entity identifier, if this value carries one.
    fn entity_id(&self) -> Option<i64>;
}

impl Identifiable for () {
    fn entity_id(&self) -> Option<i64> {
        None
    }
}

impl Identifiable for i64 {
    fn entity_id(&self) -> Option<i64> {
        Some(*self)
    }
}

impl<T: Identifiable> Identifiable for Option<T> {
    fn entity_id(&self) -> Option<i64> {
        self.as_ref().and_then(Identifiable::entity_id)
    }
}

macro_rules! impl_identifiable_for_id {
    ($($t:ty),*) => {
        $(
            impl Identifiable for $t {
                fn entity_id(&self) -> Option<i64> {
                    Some(self.get())
                }
            }
        )*
    };
}

impl_identifiable_for_id!(
    crate::TenantId,
    crate::PrincipalId,
    crate::RoleId,
    crate::PermissionId
);
