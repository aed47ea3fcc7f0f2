use std::sync::Arc;

use iamflow_core::StoreResult;

use crate::ActivityEntry;

/// Destination for activity records.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: ActivityEntry) -> StoreResult<()>;
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, entry: ActivityEntry) -> StoreResult<()> {
        (**self).record(entry)
    }
}
