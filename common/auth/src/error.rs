use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Terminal outcomes of token issuance and verification.
///
/// Every denial kind maps to the same access-control outcome (401); only the
/// reason code differs, for logging and client diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token subject must not be empty")]
    InvalidSubject,
    #[error("authorization header missing")]
    MissingToken,
    #[error("authorization header malformed")]
    MalformedHeader,
    #[error("token malformed")]
    MalformedToken,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token expired")]
    ExpiredToken,
    #[error("signing secret must not be empty")]
    InvalidSecret,
    #[error("issuance time out of range")]
    TimestampOutOfRange,
    #[error("failed to encode token claims")]
    Encoding,
}

impl AuthError {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidSubject => "INVALID_SUBJECT",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::MalformedHeader => "MALFORMED_HEADER",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::InvalidSecret => "INVALID_SECRET",
            AuthError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            AuthError::Encoding => "TOKEN_ENCODING",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidSubject | AuthError::TimestampOutOfRange => StatusCode::BAD_REQUEST,
            AuthError::InvalidSecret | AuthError::Encoding => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
