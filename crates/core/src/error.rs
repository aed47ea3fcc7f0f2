//! Shared error model.

use thiserror::Error;

/// Result type used by store adapters.
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failure reported by an external store.
///
/// Keep this focused on "the store could not answer". A missing row is not an
/// error at this layer; lookups return `Ok(None)` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write conflicted with existing state (e.g. duplicate natural key).
    #[error("store conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// A required input was missing, blank or malformed.
///
/// Always a caller error; never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("precondition violated: {0}")]
pub struct PreconditionViolation(String);

impl PreconditionViolation {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Reject blank (empty or whitespace-only) input, returning it trimmed.
pub fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str, PreconditionViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PreconditionViolation::new(format!("{field} cannot be blank")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_blank("email", "").is_err());
        assert!(require_non_blank("email", "   ").is_err());
    }

    #[test]
    fn non_blank_values_are_trimmed() {
        assert_eq!(require_non_blank("email", " a@x.com ").unwrap(), "a@x.com");
    }
}
