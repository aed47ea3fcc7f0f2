//! Service wiring and the operations behind the HTTP handlers.
//!
//! Handlers stay thin: they parse, call one method here, and map the result.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use iamflow_audit::{ActivityAction, ActivitySpec, AuditSink, EntityType, audited};
use iamflow_auth::{
    AuthenticatedPrincipal, AuthenticatorRouter, CredentialStore, Credentials,
    IdentityBinder, RequestContext, SessionClaims, TokenCodec,
};
use iamflow_core::{PreconditionViolation, TenantId, require_non_blank};
use iamflow_infra::AppConfig;
use iamflow_infra::mail::{
    DispatchError, LinkBuilder, LogTransport, MailDispatchPool, MailNotifier, MailPoolConfig,
    NotificationDispatcher,
};
use iamflow_infra::store::{InMemoryAuditSink, InMemoryOtpStore};
use iamflow_otp::{OtpManager, OtpStore, OtpValidationStatus};

use crate::app::errors::ApiError;

pub type SharedCredentialStore = Arc<dyn CredentialStore>;
pub type SharedOtpStore = Arc<dyn OtpStore>;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct AppServices {
    credentials: SharedCredentialStore,
    router: AuthenticatorRouter<SharedCredentialStore>,
    binder: IdentityBinder<SharedCredentialStore>,
    codec: TokenCodec,
    otp: OtpManager<SharedOtpStore>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn NotificationDispatcher>,
    links: LinkBuilder,
}

impl AppServices {
    pub fn new(
        config: &AppConfig,
        credentials: SharedCredentialStore,
        otp_store: SharedOtpStore,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let codec = TokenCodec::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.token_ttl_secs),
        );

        Self {
            router: AuthenticatorRouter::new(credentials.clone()),
            binder: IdentityBinder::new(codec.clone(), credentials.clone()),
            credentials,
            codec,
            otp: OtpManager::new(otp_store).with_ttl(Duration::seconds(config.otp_ttl_secs)),
            audit,
            notifier,
            links: LinkBuilder::new(config.ui_base_url.clone()),
        }
    }

    pub fn binder(&self) -> &IdentityBinder<SharedCredentialStore> {
        &self.binder
    }

    /// Authenticate, record the login, and issue a session token.
    pub fn login(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
    ) -> Result<IssuedSession, ApiError> {
        let (entity_type, tenant_id) = match credentials {
            Credentials::Root(_) => (EntityType::RootUser, None),
            Credentials::Tenant(c) => (EntityType::User, Some(c.tenant_id)),
        };
        let spec = ActivitySpec::new(ActivityAction::Login, entity_type)
            .log_on_failure()
            .actor(credentials.email().trim())
            .tenant(tenant_id);

        let principal: AuthenticatedPrincipal =
            audited(self.audit.as_ref(), ctx, &spec, &[], || {
                self.router.authenticate(credentials)
            })?;

        self.credentials.record_login(principal.id(), Utc::now())?;

        let (token, claims) = self.codec.issue(&principal)?;
        info!(principal_id = %principal.id(), is_root = claims.is_root, "session issued");
        Ok(IssuedSession { token, claims })
    }

    /// Check a submitted code; a valid code activates the principal it was
    /// issued for.
    pub fn validate_otp(
        &self,
        tenant_id: Option<TenantId>,
        email: &str,
        otp: &str,
    ) -> Result<OtpValidationStatus, ApiError> {
        let status = self.otp.validate(email, otp)?;

        if status.is_valid() && !self.credentials.activate(tenant_id, email.trim())? {
            warn!(?tenant_id, "valid otp for unknown principal");
        }
        Ok(status)
    }

    /// Issue a new code and send it: root principals get the code itself,
    /// tenant users get a verification link.
    ///
    /// Unknown principals get the same answer as known ones and nothing is
    /// issued or sent. Delivery is best effort; a full mail queue does not
    /// fail the request.
    pub fn resend_otp(
        &self,
        tenant_id: Option<TenantId>,
        email: &str,
        is_root: bool,
    ) -> Result<(), ApiError> {
        let email = require_non_blank("email", email)?;

        let principal = if is_root {
            self.credentials
                .find_root_by_email(email)?
                .filter(|p| tenant_id.is_none_or(|t| p.tenant_id == Some(t)))
        } else {
            let Some(tenant_id) = tenant_id else {
                return Err(PreconditionViolation::new("tenantId is required for tenant users").into());
            };
            self.credentials.find_by_tenant_and_email(tenant_id, email)?
        };

        let Some(principal) = principal else {
            info!(?tenant_id, is_root, "otp resend for unknown principal ignored");
            return Ok(());
        };

        let otp = self.otp.resend(&principal.email)?;

        let sent = match principal.tenant_id {
            Some(tenant_id) if !is_root => {
                let link = self.links.verification_link(&otp.code, tenant_id.get(), &principal.email);
                self.notifier.send_verification_link(&principal.email, &link)
            }
            _ => self.notifier.send_otp(&principal.email, &otp.code),
        };

        if let Err(e) = sent {
            warn!(error = %e, "verification mail not queued");
        }
        Ok(())
    }
}

/// Dev/default wiring: in-memory OTP store and audit sink, mail logged
/// through a bounded worker pool.
pub fn build_services(
    config: &AppConfig,
    credentials: SharedCredentialStore,
) -> Result<AppServices, DispatchError> {
    let pool = MailDispatchPool::start(
        Arc::new(LogTransport),
        MailPoolConfig::default()
            .with_workers(config.mail_workers)
            .with_queue_capacity(config.mail_queue_capacity),
    )?;

    Ok(AppServices::new(
        config,
        credentials,
        Arc::new(InMemoryOtpStore::new()),
        Arc::new(InMemoryAuditSink::new()),
        Arc::new(MailNotifier::new(Arc::new(pool))),
    ))
}

