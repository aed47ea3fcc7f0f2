//! `iamflow-otp`: one-time codes for email ownership verification.

pub mod code;
pub mod generator;
pub mod manager;
pub mod store;

pub use code::{OtpCode, OtpValidationStatus};
pub use generator::{OTP_MAX, OTP_MIN, OtpGenerator, RandomOtpGenerator};
pub use manager::{DEFAULT_OTP_TTL_SECS, OtpError, OtpManager};
pub use store::OtpStore;
