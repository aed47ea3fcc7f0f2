//! OTP lifecycle: generate, validate, resend, delete.
//!
//! Per email: NONE -> ACTIVE -> USED. A generate on an existing row starts a
//! fresh ACTIVE window on the same row. Emails are keyed case-insensitively.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};

use iamflow_core::{PreconditionViolation, StoreError, require_non_blank};

use crate::code::{OtpCode, OtpValidationStatus};
use crate::generator::{OtpGenerator, RandomOtpGenerator};
use crate::store::OtpStore;

/// Default code lifetime.
pub const DEFAULT_OTP_TTL_SECS: i64 = 180;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error(transparent)]
    PreconditionViolation(#[from] PreconditionViolation),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct OtpManager<S, G = RandomOtpGenerator> {
    store: S,
    generator: G,
    ttl: Duration,
}

impl<S: OtpStore> OtpManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            generator: RandomOtpGenerator,
            ttl: Duration::seconds(DEFAULT_OTP_TTL_SECS),
        }
    }
}

impl<S: OtpStore, G: OtpGenerator> OtpManager<S, G> {
    pub fn with_generator<G2: OtpGenerator>(self, generator: G2) -> OtpManager<S, G2> {
        OtpManager {
            store: self.store,
            generator,
            ttl: self.ttl,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generate(&self, email: &str) -> Result<OtpCode, OtpError> {
        self.generate_at(email, Utc::now())
    }

    /// Issue a fresh code for `email`, valid until `now + ttl`.
    ///
    /// An existing row is overwritten in place and becomes unused again.
    pub fn generate_at(&self, email: &str, now: DateTime<Utc>) -> Result<OtpCode, OtpError> {
        let email = normalize_email(email)?;
        let email = email.as_str();
        let otp = OtpCode::new(email, self.generator.next_code(), now, now + self.ttl);

        if self.store.find(email)?.is_some() {
            self.overwrite(&otp)?;
        } else {
            match self.store.create(otp.clone()) {
                Ok(()) => {}
                // Lost a race with a concurrent generate; last writer wins.
                Err(StoreError::Conflict(_)) => self.overwrite(&otp)?,
                Err(e) => return Err(e.into()),
            }
        }

        debug!(expires_at = %otp.expires_at, "otp issued");
        Ok(otp)
    }

    fn overwrite(&self, otp: &OtpCode) -> Result<(), OtpError> {
        if self
            .store
            .update_code(&otp.email, &otp.code, otp.created_at, otp.expires_at)?
        {
            Ok(())
        } else {
            // Row vanished between find and update.
            self.store.create(otp.clone()).map_err(OtpError::from)
        }
    }

    pub fn validate(&self, email: &str, submitted: &str) -> Result<OtpValidationStatus, OtpError> {
        self.validate_at(email, submitted, Utc::now())
    }

    /// Check `submitted` against the live code for `email` at `now`.
    ///
    /// A `Valid` answer consumes the code.
    pub fn validate_at(
        &self,
        email: &str,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpValidationStatus, OtpError> {
        let email = normalize_email(email)?;
        let email = email.as_str();
        let submitted = submitted.trim();

        let Some(otp) = self.store.find(email)? else {
            return Ok(OtpValidationStatus::NotFound);
        };

        let status = if otp.is_expired_at(now) {
            OtpValidationStatus::Expired
        } else if otp.used {
            OtpValidationStatus::AlreadyUsed
        } else if !otp.matches(submitted) {
            OtpValidationStatus::Invalid
        } else if self.store.mark_used(email, submitted)? {
            OtpValidationStatus::Valid
        } else {
            // Consumed concurrently between find and mark.
            OtpValidationStatus::AlreadyUsed
        };

        info!(%status, "otp validated");
        Ok(status)
    }

    /// Same as [`generate`](Self::generate): a resend always replaces the code.
    pub fn resend(&self, email: &str) -> Result<OtpCode, OtpError> {
        self.generate(email)
    }

    pub fn delete(&self, email: &str) -> Result<bool, OtpError> {
        let email = normalize_email(email)?;
        Ok(self.store.delete_by_email(&email)?)
    }
}

fn normalize_email(email: &str) -> Result<String, PreconditionViolation> {
    require_non_blank("email", email).map(str::to_ascii_lowercase)
}
