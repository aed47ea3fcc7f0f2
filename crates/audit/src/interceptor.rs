//! Explicit audit decorator.
//!
//! Call sites wrap the operation they want recorded:
//!
//! ```ignore
//! let principal = audited(&sink, &ctx, &ActivitySpec::new(Login, User), &[], || {
//!     router.authenticate(&credentials)
//! })?;
//! ```

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use iamflow_auth::RequestContext;
use iamflow_core::{Identifiable, TenantId};

use crate::entry::{ActivityAction, ActivityEntry, EntityType};
use crate::sink::AuditSink;

/// How one audited operation should be recorded.
#[derive(Debug, Clone)]
pub struct ActivitySpec {
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub description: Option<String>,
    pub log_on_failure: bool,
    /// Overrides the caller identity, e.g. for logins where no identity is
    /// bound yet.
    pub actor: Option<String>,
    pub tenant_id: Option<TenantId>,
}

impl ActivitySpec {
    pub fn new(action: ActivityAction, entity_type: EntityType) -> Self {
        Self {
            action,
            entity_type,
            description: None,
            log_on_failure: false,
            actor: None,
            tenant_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn log_on_failure(mut self) -> Self {
        self.log_on_failure = true;
        self
    }

    pub fn actor(mut self, email: impl Into<String>) -> Self {
        self.actor = Some(email.into());
        self
    }

    pub fn tenant(mut self, tenant_id: Option<TenantId>) -> Self {
        self.tenant_id = tenant_id;
        self
    }
}

/// Run `op` and record what happened.
///
/// The result of `op` is returned unchanged. Failures are recorded only when
/// `spec.log_on_failure` is set; sink errors are logged and dropped.
pub fn audited<T, E, F>(
    sink: &dyn AuditSink,
    ctx: &RequestContext,
    spec: &ActivitySpec,
    args: &[&dyn Identifiable],
    op: F,
) -> Result<T, E>
where
    T: Identifiable,
    F: FnOnce() -> Result<T, E>,
{
    let outcome = op();

    let result_id = match &outcome {
        Ok(value) => value.entity_id(),
        Err(_) if spec.log_on_failure => None,
        Err(_) => return outcome,
    };

    let entry = build_entry(ctx, spec, outcome.is_err(), result_id, args);
    if let Err(e) = sink.record(entry) {
        warn!(error = %e, action = %spec.action, "failed to record activity");
    }

    outcome
}

fn build_entry(
    ctx: &RequestContext,
    spec: &ActivitySpec,
    failed: bool,
    result_id: Option<i64>,
    args: &[&dyn Identifiable],
) -> ActivityEntry {
    let action = if failed {
        format!("{}_FAILED", spec.action)
    } else {
        spec.action.to_string()
    };

    let description = spec.description.clone().unwrap_or_else(|| {
        let status = if failed { "failed" } else { "completed" };
        format!("{} {} {}", spec.entity_type, action.to_lowercase(), status)
    });

    let entity_id = result_id.or_else(|| fallback_entity_id(ctx, spec.entity_type, args));

    let tenant_id = spec
        .tenant_id
        .or_else(|| ctx.identity.as_ref().and_then(|i| i.tenant_id))
        .or_else(|| path_segment_id(&ctx.path, "accounts").map(TenantId::new));

    ActivityEntry {
        id: Uuid::now_v7(),
        actor_email: spec.actor.clone().or_else(|| ctx.actor().map(str::to_string)),
        tenant_id,
        action,
        entity_type: spec.entity_type,
        entity_id,
        description,
        client_ip: ctx.client.ip.clone(),
        user_agent: ctx.client.user_agent.clone(),
        timestamp: Utc::now(),
    }
}

fn fallback_entity_id(
    ctx: &RequestContext,
    entity_type: EntityType,
    args: &[&dyn Identifiable],
) -> Option<i64> {
    match entity_type {
        EntityType::Account => path_segment_id(&ctx.path, "accounts"),
        EntityType::User => ctx
            .identity
            .as_ref()
            .map(|i| i.principal_id.get())
            .or_else(|| path_segment_id(&ctx.path, "users")),
        EntityType::Role => path_segment_id(&ctx.path, "roles"),
        EntityType::RootUser | EntityType::Permission => {
            args.iter().find_map(|arg| arg.entity_id())
        }
    }
}

/// Numeric segment right after `name` in `path`, e.g. `42` in
/// `/api/v1/accounts/42/users`.
fn path_segment_id(path: &str, name: &str) -> Option<i64> {
    let mut segments = path.split('/');
    while let Some(segment) = segments.next() {
        if segment == name {
            return segments.next().and_then(|s| s.parse().ok());
        }
    }
    None
}
