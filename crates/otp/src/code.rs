use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single live code for one email address.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl OtpCode {
    pub fn new(
        email: impl Into<String>,
        code: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email: email.into(),
            code: code.into(),
            created_at,
            expires_at,
            used: false,
        }
    }

    /// Compare `submitted` with the stored code in constant time.
    pub fn matches(&self, submitted: &str) -> bool {
        ring::constant_time::verify_slices_are_equal(self.code.as_bytes(), submitted.as_bytes())
            .is_ok()
    }

    /// Expiry is inclusive: a code is still live at exactly `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl core::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OtpCode")
            .field("email", &self.email)
            .field("code", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("used", &self.used)
            .finish()
    }
}

/// Outcome of checking a submitted code. Not an error: every variant is a
/// normal answer to the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpValidationStatus {
    Valid,
    Invalid,
    Expired,
    NotFound,
    AlreadyUsed,
}

impl OtpValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpValidationStatus::Valid => "VALID",
            OtpValidationStatus::Invalid => "INVALID",
            OtpValidationStatus::Expired => "EXPIRED",
            OtpValidationStatus::NotFound => "NOT_FOUND",
            OtpValidationStatus::AlreadyUsed => "ALREADY_USED",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, OtpValidationStatus::Valid)
    }
}

impl core::fmt::Display for OtpValidationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
