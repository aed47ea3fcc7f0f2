//! Process configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use iamflow_core::TenantId;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UI_BASE_URL: &str = "http://localhost:5173";
pub const DEV_JWT_SECRET: &str = "dev-secret";

pub const MIN_MAIL_WORKERS: usize = 5;
pub const MAX_MAIL_WORKERS: usize = 10;
pub const DEFAULT_MAIL_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Root principal created at startup when the credential store is empty.
#[derive(Clone)]
pub struct BootstrapRoot {
    pub tenant_id: TenantId,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapRoot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapRoot")
            .field("tenant_id", &self.tenant_id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub otp_ttl_secs: i64,
    pub ui_base_url: String,
    pub mail_workers: usize,
    pub mail_queue_capacity: usize,
    pub bootstrap_root: Option<BootstrapRoot>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("otp_ttl_secs", &self.otp_ttl_secs)
            .field("ui_base_url", &self.ui_base_url)
            .field("mail_workers", &self.mail_workers)
            .field("mail_queue_capacity", &self.mail_queue_capacity)
            .field("bootstrap_root", &self.bootstrap_root)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (used by tests instead of the
    /// process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr: SocketAddr = parse_or(&lookup, "IAMFLOW_BIND_ADDR", || {
            DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|e| e.to_string())
        })?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl_secs = positive(&lookup, "IAMFLOW_TOKEN_TTL_SECS", 3600)?;
        let otp_ttl_secs = positive(&lookup, "IAMFLOW_OTP_TTL_SECS", 180)?;

        let ui_base_url = lookup("IAMFLOW_UI_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_UI_BASE_URL.to_string());

        let requested_workers: usize = parse_or(&lookup, "IAMFLOW_MAIL_WORKERS", || Ok(MIN_MAIL_WORKERS))?;
        let mail_workers = requested_workers.clamp(MIN_MAIL_WORKERS, MAX_MAIL_WORKERS);
        if mail_workers != requested_workers {
            warn!(requested_workers, mail_workers, "mail worker count clamped");
        }

        let mail_queue_capacity: usize =
            parse_or(&lookup, "IAMFLOW_MAIL_QUEUE_CAPACITY", || Ok(DEFAULT_MAIL_QUEUE_CAPACITY))?;
        if mail_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "IAMFLOW_MAIL_QUEUE_CAPACITY",
                reason: "must be at least 1".to_string(),
            });
        }

        let bootstrap_root = match (lookup("IAMFLOW_ROOT_EMAIL"), lookup("IAMFLOW_ROOT_PASSWORD")) {
            (None, None) => None,
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                let tenant_id: i64 = parse_or(&lookup, "IAMFLOW_ROOT_TENANT_ID", || Ok(1))?;
                Some(BootstrapRoot {
                    tenant_id: TenantId::new(tenant_id),
                    email: email.trim().to_string(),
                    password,
                })
            }
            _ => {
                return Err(ConfigError::Invalid {
                    key: "IAMFLOW_ROOT_EMAIL",
                    reason: "IAMFLOW_ROOT_EMAIL and IAMFLOW_ROOT_PASSWORD must be set together".to_string(),
                });
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            otp_ttl_secs,
            ui_base_url,
            mail_workers,
            mail_queue_capacity,
            bootstrap_root,
        })
    }
}

fn parse_or<T, F, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => default().map_err(|reason| ConfigError::Invalid { key, reason }),
    }
}

fn positive<F>(lookup: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: i64 = parse_or(lookup, key, || Ok(default))?;
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: "must be positive".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.token_ttl_secs, 3600);
        assert_eq!(cfg.otp_ttl_secs, 180);
        assert_eq!(cfg.ui_base_url, DEFAULT_UI_BASE_URL);
        assert_eq!(cfg.mail_workers, 5);
        assert_eq!(cfg.mail_queue_capacity, 100);
    }

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(config(&[("IAMFLOW_MAIL_WORKERS", "64")]).unwrap().mail_workers, 10);
        assert_eq!(config(&[("IAMFLOW_MAIL_WORKERS", "1")]).unwrap().mail_workers, 5);
        assert_eq!(config(&[("IAMFLOW_MAIL_WORKERS", "7")]).unwrap().mail_workers, 7);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = config(&[("IAMFLOW_TOKEN_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "IAMFLOW_TOKEN_TTL_SECS", .. }));

        let err = config(&[("IAMFLOW_OTP_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "IAMFLOW_OTP_TTL_SECS", .. }));
    }

    #[test]
    fn ui_base_url_loses_trailing_slash() {
        let cfg = config(&[("IAMFLOW_UI_BASE_URL", "https://app.example.com/")]).unwrap();
        assert_eq!(cfg.ui_base_url, "https://app.example.com");
    }

    #[test]
    fn bootstrap_root_needs_both_halves() {
        assert!(config(&[]).unwrap().bootstrap_root.is_none());

        let err = config(&[("IAMFLOW_ROOT_EMAIL", "root@x.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "IAMFLOW_ROOT_EMAIL", .. }));

        let cfg = config(&[
            ("IAMFLOW_ROOT_EMAIL", "root@x.com"),
            ("IAMFLOW_ROOT_PASSWORD", "pw"),
            ("IAMFLOW_ROOT_TENANT_ID", "42"),
        ])
        .unwrap();
        let root = cfg.bootstrap_root.unwrap();
        assert_eq!(root.tenant_id, TenantId::new(42));
        assert_eq!(root.email, "root@x.com");
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = config(&[("JWT_SECRET", "super-secret-value")]).unwrap();
        assert!(!format!("{cfg:?}").contains("super-secret-value"));
    }
}
