use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Identity and validity window carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// `exp` as a UTC timestamp, if representable.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn to_json(&self) -> AuthResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|_| AuthError::Encoding)
    }

    /// Parse a presented payload; `sub` and `exp` are required, `sub` must be non-empty.
    pub(crate) fn from_json(payload: &[u8]) -> AuthResult<Self> {
        let claims: Claims =
            serde_json::from_slice(payload).map_err(|_| AuthError::MalformedToken)?;
        if claims.subject.is_empty() {
            return Err(AuthError::MalformedToken);
        }
        Ok(claims)
    }
}
