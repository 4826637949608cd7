//! Entity traits: identity + audit trail.

use crate::audit::AuditFields;
use crate::id::RecordId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// A persisted row: store-assigned id plus the shared audit columns.
///
/// Records are created with `RecordId::new(0)`; the store assigns the real id
/// on insert through [`Record::set_id`].
pub trait Record: Entity<Id = RecordId> + Clone + Send + Sync + 'static {
    fn set_id(&mut self, id: RecordId);

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted
    }
}

/// Implement [`Entity`] and [`Record`] for structs with `id: RecordId` and
/// `audit: AuditFields` fields.
#[macro_export]
macro_rules! impl_record {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::Entity for $t {
                type Id = $crate::RecordId;

                fn id(&self) -> &Self::Id {
                    &self.id
                }
            }

            impl $crate::Record for $t {
                fn set_id(&mut self, id: $crate::RecordId) {
                    self.id = id;
                }

                fn audit(&self) -> &$crate::AuditFields {
                    &self.audit
                }

                fn audit_mut(&mut self) -> &mut $crate::AuditFields {
                    &mut self.audit
                }
            }
        )+
    };
}
