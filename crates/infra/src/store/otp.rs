use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use iamflow_core::{StoreError, StoreResult};
use iamflow_otp::{OtpCode, OtpStore};

/// One row per email. Every operation holds the lock for its full
/// read-modify-write, so `mark_used` is atomic.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    rows: Mutex<HashMap<String, OtpCode>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OtpStore for InMemoryOtpStore {
    fn create(&self, otp: OtpCode) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        if rows.contains_key(&otp.email) {
            return Err(StoreError::conflict("otp row exists for email"));
        }
        rows.insert(otp.email.clone(), otp);
        Ok(())
    }

    fn find(&self, email: &str) -> StoreResult<Option<OtpCode>> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.get(email).cloned())
    }

    fn update_code(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(row) = rows.get_mut(email) else {
            return Ok(false);
        };
        row.code = code.to_string();
        row.created_at = created_at;
        row.expires_at = expires_at;
        row.used = false;
        Ok(true)
    }

    fn mark_used(&self, email: &str, code: &str) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        match rows.get_mut(email) {
            Some(row) if !row.used && row.code == code => {
                row.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete_by_email(&self, email: &str) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.remove(email).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use chrono::Duration;
    use iamflow_otp::{OtpManager, OtpValidationStatus};

    #[test]
    fn mark_used_is_conditional_on_code() {
        let store = InMemoryOtpStore::new();
        let now = Utc::now();
        store
            .create(OtpCode::new("b@y.com", "123456", now, now + Duration::minutes(3)))
            .unwrap();

        assert!(!store.mark_used("b@y.com", "654321").unwrap());
        assert!(store.mark_used("b@y.com", "123456").unwrap());
        assert!(!store.mark_used("b@y.com", "123456").unwrap());
    }

    #[test]
    fn concurrent_validation_consumes_once() {
        let store = Arc::new(InMemoryOtpStore::new());
        let manager = Arc::new(OtpManager::new(store.clone()));
        let otp = manager.generate("b@y.com").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                let code = otp.code.clone();
                thread::spawn(move || manager.validate("b@y.com", &code).unwrap())
            })
            .collect();

        let valid = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|s| *s == OtpValidationStatus::Valid)
            .count();
        assert_eq!(valid, 1);
        assert_eq!(store.len(), 1);
    }
}
