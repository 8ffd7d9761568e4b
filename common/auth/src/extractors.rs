use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue};
use chrono::Utc;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::gate::AuthGate;

/// Verified caller identity handed to protected operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn subject(&self) -> &str {
        self.claims.subject()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AuthGate>::from_ref(state);

        let header = parts.headers.get(AUTHORIZATION).map(HeaderValue::as_bytes);

        let claims = gate
            .authorize_bytes(header, Utc::now().timestamp())
            .into_result()?;
        Ok(Self::new(claims))
    }
}
