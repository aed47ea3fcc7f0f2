use rand::Rng;

/// Smallest code handed out (always six digits).
pub const OTP_MIN: u32 = 100_000;
/// Largest code handed out.
pub const OTP_MAX: u32 = 999_999;

/// Source of fresh codes.
pub trait OtpGenerator: Send + Sync {
    fn next_code(&self) -> String;
}

/// Uniform six-digit codes from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOtpGenerator;

impl OtpGenerator for RandomOtpGenerator {
    fn next_code(&self) -> String {
        rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
    }
}
