//! In-memory adapters for the engine's store traits (tests and dev).

mod audit;
mod credentials;
mod otp;

pub use audit::InMemoryAuditSink;
pub use credentials::InMemoryCredentialStore;
pub use otp::InMemoryOtpStore;
