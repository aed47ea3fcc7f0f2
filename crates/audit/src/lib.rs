//! `iamflow-audit`: activity records around audited operations.
//!
//! Recording is fire-and-forget: a failing sink never changes the outcome of
//! the operation being audited.

pub mod entry;
pub mod interceptor;
pub mod sink;

pub use entry::{ActivityAction, ActivityEntry, EntityType};
pub use interceptor::{ActivitySpec, audited};
pub use sink::AuditSink;
