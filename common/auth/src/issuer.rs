use chrono::{DateTime, Utc};
use tracing::debug;

use crate::claims::Claims;
use crate::codec::{self, HEADER_JSON};
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Seconds `iat` is backdated to absorb clock skew between issuer and verifier.
pub const ISSUED_AT_SKEW_SECONDS: i64 = 1;

/// Signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at_utc()
    }
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn issue(&self, subject: &str, now: i64) -> AuthResult<IssuedToken> {
        if subject.trim().is_empty() {
            return Err(AuthError::InvalidSubject);
        }

        let issued_at = now
            .checked_sub(ISSUED_AT_SKEW_SECONDS)
            .ok_or(AuthError::TimestampOutOfRange)?;
        let expires_at = now
            .checked_add(i64::from(self.config.validity_seconds))
            .ok_or(AuthError::TimestampOutOfRange)?;

        let claims = Claims {
            subject: subject.to_owned(),
            issued_at: Some(issued_at),
            expires_at,
        };

        let payload = claims.to_json()?;
        let signature = codec::sign(HEADER_JSON, &payload, &self.config.secret);
        let token = codec::encode(HEADER_JSON, &payload, &signature);
        debug!(expires_at = claims.expires_at, "issued token");

        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    fn issuer(validity: u32) -> TokenIssuer {
        let secret = Secret::new("issuer-test-secret").expect("secret");
        TokenIssuer::new(TokenConfig::new(secret).with_validity_seconds(validity))
    }

    #[test]
    fn issue_backdates_iat_and_applies_window() {
        let issued = issuer(3600).issue("usuario_demo", 1000).expect("issue");
        assert_eq!(issued.claims.subject, "usuario_demo");
        assert_eq!(issued.claims.issued_at, Some(999));
        assert_eq!(issued.claims.expires_at, 4600);
        assert!(issued.claims.expires_at > issued.claims.issued_at.unwrap_or_default());
    }

    #[test]
    fn issue_rejects_blank_subject() {
        let issuer = issuer(60);
        assert_eq!(issuer.issue("", 0), Err(AuthError::InvalidSubject));
        assert_eq!(issuer.issue("   ", 0), Err(AuthError::InvalidSubject));
    }

    #[test]
    fn issue_rejects_unrepresentable_times() {
        let issuer = issuer(3600);
        assert_eq!(
            issuer.issue("a", i64::MAX),
            Err(AuthError::TimestampOutOfRange)
        );
        assert_eq!(
            issuer.issue("a", i64::MIN),
            Err(AuthError::TimestampOutOfRange)
        );

        let edge = issuer.issue("a", i64::MAX - 3600).expect("issue");
        assert_eq!(edge.claims.expires_at, i64::MAX);
        let floor = issuer.issue("a", i64::MIN + 1).expect("issue");
        assert_eq!(floor.claims.issued_at, Some(i64::MIN));
    }

    #[test]
    fn issue_is_deterministic() {
        let issuer = issuer(60);
        let first = issuer.issue("alice", 1_700_000_000).expect("issue");
        let second = issuer.issue("alice", 1_700_000_000).expect("issue");
        assert_eq!(first, second);

        let later = issuer.issue("alice", 1_700_000_001).expect("issue");
        assert_ne!(first.token, later.token);
    }

    #[test]
    fn every_token_shares_the_fixed_header() {
        let issuer = issuer(60);
        let a = issuer.issue("alice", 10).expect("issue");
        let b = issuer.issue("bob", 20).expect("issue");
        let header = |token: &str| token.split('.').next().map(str::to_owned);
        assert_eq!(header(&a.token), header(&b.token));
        assert_eq!(
            header(&a.token).as_deref(),
            Some("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9")
        );
    }

    #[test]
    fn expires_at_renders_as_utc() {
        let issued = issuer(3600).issue("alice", 0).expect("issue");
        let expires = issued.expires_at().expect("timestamp");
        assert_eq!(expires.to_rfc3339(), "1970-01-01T01:00:00+00:00");
    }
}
