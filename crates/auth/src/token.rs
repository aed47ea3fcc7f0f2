//! Session token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use iamflow_core::require_non_blank;

use crate::claims::{SessionClaims, validate_claims};
use crate::error::AuthError;
use crate::principal::AuthenticatedPrincipal;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Turns session claims into signed tokens and back.
///
/// Stateless: nothing is persisted server-side and there is no revocation.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_key: bool,
    ttl: Duration,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("has_key", &self.has_key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            has_key: !secret.is_empty(),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Claims for a freshly authenticated principal, issued at `now`.
    ///
    /// Timestamps are truncated to whole seconds, the precision of the wire
    /// format.
    pub fn claims_for(&self, principal: &AuthenticatedPrincipal, now: DateTime<Utc>) -> SessionClaims {
        let issued_at = now.trunc_subsecs(0);
        SessionClaims {
            email: principal.email().to_string(),
            is_root: principal.is_root(),
            tenant_id: if principal.is_root() {
                None
            } else {
                principal.tenant_id()
            },
            issued_at,
            expires_at: issued_at + self.ttl,
        }
    }

    /// Issue a token for `principal`, valid from now for the configured ttl.
    pub fn issue(&self, principal: &AuthenticatedPrincipal) -> Result<(String, SessionClaims), AuthError> {
        let claims = self.claims_for(principal, Utc::now());
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    /// Sign the given claims.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        if !self.has_key {
            return Err(AuthError::TokenIssuanceFailed(
                "signing key is empty".to_string(),
            ));
        }
        if claims.expires_at <= claims.issued_at {
            return Err(AuthError::TokenIssuanceFailed(
                "expiry must be after issue time".to_string(),
            ));
        }

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssuanceFailed(format!("JWT encode: {e}")))
    }

    /// Verify signature and time window against the current time.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify signature and time window against `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let token = require_non_blank("token", token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the supplied clock so
        // the boundary is exact and testable.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::token_invalid(e.to_string()))?;

        validate_claims(&claims, now).map_err(|e| AuthError::token_invalid(e.to_string()))?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use iamflow_core::TenantId;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret-with-enough-entropy";

    fn codec() -> TokenCodec {
        TokenCodec::with_default_ttl(SECRET)
    }

    fn tenant_claims(issued_at: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            email: "a@x.com".to_string(),
            is_root: false,
            tenant_id: Some(TenantId::new(42)),
            issued_at,
            expires_at: issued_at + Duration::hours(1),
        }
    }

    #[test]
    fn roundtrip_preserves_claims() {
        let issued = Utc::now().trunc_subsecs(0);
        let claims = tenant_claims(issued);
        let token = codec().encode(&claims).unwrap();

        let decoded = codec().decode(&token).unwrap();
        assert_eq!(decoded, claims);
        assert!(decoded.expires_at > decoded.issued_at);
    }

    #[test]
    fn expired_token_is_invalid() {
        let issued = Utc::now().trunc_subsecs(0) - Duration::hours(2);
        let token = codec().encode(&tenant_claims(issued)).unwrap();

        assert!(matches!(codec().decode(&token), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn expiry_boundary_is_exact() {
        let issued = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let claims = tenant_claims(issued);
        let token = codec().encode(&claims).unwrap();

        assert!(codec().decode_at(&token, claims.expires_at - Duration::milliseconds(1)).is_ok());
        assert!(matches!(
            codec().decode_at(&token, claims.expires_at + Duration::milliseconds(1)),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn wrong_key_is_invalid() {
        let token = codec().encode(&tenant_claims(Utc::now().trunc_subsecs(0))).unwrap();
        let other = TokenCodec::with_default_ttl(b"another-secret");
        assert!(matches!(other.decode(&token), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let token = codec().encode(&tenant_claims(Utc::now().trunc_subsecs(0))).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = codec()
            .encode(&SessionClaims {
                tenant_id: Some(TenantId::new(99)),
                ..tenant_claims(Utc::now().trunc_subsecs(0))
            })
            .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        let spliced = parts.join(".");

        assert!(matches!(codec().decode(&spliced), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            codec().decode("not.a.jwt"),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn blank_token_is_precondition_violation() {
        assert!(matches!(
            codec().decode(""),
            Err(AuthError::PreconditionViolation(_))
        ));
        assert!(matches!(
            codec().decode("   "),
            Err(AuthError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn empty_key_cannot_issue() {
        let codec = TokenCodec::with_default_ttl(b"");
        assert!(matches!(
            codec.encode(&tenant_claims(Utc::now())),
            Err(AuthError::TokenIssuanceFailed(_))
        ));
    }

    proptest! {
        #[test]
        fn roundtrip_for_arbitrary_identities(
            local in "[a-z]{1,12}",
            is_root in any::<bool>(),
            tenant in 1i64..1_000_000,
            offset_secs in 0i64..3599,
        ) {
            let issued = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
            let claims = SessionClaims {
                email: format!("{local}@example.com"),
                is_root,
                tenant_id: if is_root { None } else { Some(TenantId::new(tenant)) },
                issued_at: issued,
                expires_at: issued + Duration::hours(1),
            };
            let token = codec().encode(&claims).unwrap();
            let decoded = codec().decode_at(&token, issued + Duration::seconds(offset_secs)).unwrap();
            prop_assert_eq!(&decoded, &claims);
            prop_assert!(decoded.expires_at > decoded.issued_at);
        }
    }
}
