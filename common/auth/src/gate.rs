use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::extractors::AuthContext;
use crate::verifier::TokenVerifier;

const BEARER_SCHEME: &str = "bearer";

/// Per-request access decision; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Granted(Claims),
    Denied(AuthError),
}

impl AuthDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthDecision::Granted(_))
    }

    /// Label used for logs and metrics: `granted` or the denial code.
    pub fn outcome(&self) -> &'static str {
        match self {
            AuthDecision::Granted(_) => "granted",
            AuthDecision::Denied(reason) => reason.code(),
        }
    }

    pub fn into_result(self) -> AuthResult<Claims> {
        match self {
            AuthDecision::Granted(claims) => Ok(claims),
            AuthDecision::Denied(reason) => Err(reason),
        }
    }
}

impl From<AuthResult<Claims>> for AuthDecision {
    fn from(value: AuthResult<Claims>) -> Self {
        match value {
            Ok(claims) => AuthDecision::Granted(claims),
            Err(reason) => AuthDecision::Denied(reason),
        }
    }
}

/// Boundary between the transport and the verifier.
///
/// Takes the raw authorization header value and turns it into an [`AuthDecision`].
/// Protected operations run through [`AuthGate::guard`] are only invoked after a
/// grant.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn authorize(&self, header: Option<&str>, now: i64) -> AuthDecision {
        self.decide(parse_bearer(header).and_then(|token| self.verifier.verify(token, now)))
    }

    /// Same as [`AuthGate::authorize`] for a header value still in raw transport
    /// bytes. A value that is not UTF-8 is denied as `MalformedHeader`.
    pub fn authorize_bytes(&self, header: Option<&[u8]>, now: i64) -> AuthDecision {
        let header = match header.map(std::str::from_utf8).transpose() {
            Ok(header) => header,
            Err(_) => return self.decide(Err(AuthError::MalformedHeader)),
        };
        self.authorize(header, now)
    }

    fn decide(&self, result: AuthResult<Claims>) -> AuthDecision {
        let decision = AuthDecision::from(result);
        match &decision {
            AuthDecision::Granted(_) => debug!("request authorized"),
            AuthDecision::Denied(reason) => warn!(reason = reason.code(), "request denied"),
        }
        decision
    }

    /// Run `operation` with the verified caller context, or return the denial reason
    /// without invoking it.
    pub fn guard<T, F>(&self, header: Option<&str>, now: i64, operation: F) -> AuthResult<T>
    where
        F: FnOnce(AuthContext) -> T,
    {
        let claims = self.authorize(header, now).into_result()?;
        Ok(operation(AuthContext::new(claims)))
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// An absent or empty value is `MissingToken`; anything other than exactly two
/// whitespace-separated fields with a case-insensitive `Bearer` scheme is
/// `MalformedHeader`.
pub fn parse_bearer(header: Option<&str>) -> AuthResult<&str> {
    let raw = match header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingToken),
    };

    let mut fields = raw.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedHeader),
    }
}
