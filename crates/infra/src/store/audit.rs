use std::sync::{PoisonError, RwLock};

use tracing::info;

use iamflow_audit::{ActivityEntry, AuditSink};
use iamflow_core::StoreResult;

/// Keeps activity entries in memory and mirrors each one to the log.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: RwLock<Vec<ActivityEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: ActivityEntry) -> StoreResult<()> {
        info!(
            target: "audit",
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = ?entry.entity_id,
            tenant_id = ?entry.tenant_id,
            actor = ?entry.actor_email,
            "{}",
            entry.description
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }
}
