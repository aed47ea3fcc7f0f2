use std::sync::Arc;

use chrono::{DateTime, Utc};

use iamflow_core::StoreResult;

use crate::OtpCode;

/// Persistence for one-time codes, keyed by email.
///
/// At most one row exists per email. Writes are named operations with fixed
/// fields; there is no generic save.
pub trait OtpStore: Send + Sync {
    /// Insert a new row. Fails with `StoreError::Conflict` if one exists.
    fn create(&self, otp: OtpCode) -> StoreResult<()>;

    fn find(&self, email: &str) -> StoreResult<Option<OtpCode>>;

    /// Replace code and validity window of an existing row and clear `used`.
    ///
    /// Returns `false` if no row exists.
    fn update_code(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Mark the row used, only if it is unused and still carries `code`.
    ///
    /// Returns whether this call consumed it.
    fn mark_used(&self, email: &str, code: &str) -> StoreResult<bool>;

    fn delete_by_email(&self, email: &str) -> StoreResult<bool>;
}

impl<S> OtpStore for Arc<S>
where
    S: OtpStore + ?Sized,
{
    fn create(&self, otp: OtpCode) -> StoreResult<()> {
        (**self).create(otp)
    }

    fn find(&self, email: &str) -> StoreResult<Option<OtpCode>> {
        (**self).find(email)
    }

    fn update_code(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        (**self).update_code(email, code, created_at, expires_at)
    }

    fn mark_used(&self, email: &str, code: &str) -> StoreResult<bool> {
        (**self).mark_used(email, code)
    }

    fn delete_by_email(&self, email: &str) -> StoreResult<bool> {
        (**self).delete_by_email(email)
    }
}
