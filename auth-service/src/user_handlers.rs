use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use common_auth::AuthError as TokenError;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid credentials. Please try again.",
        )
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        Self::new(value.status(), value.code(), value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// RFC 3339 UTC timestamp of the token's `exp` claim.
    pub expires_at: String,
}

/// Validate credentials and issue a bearer token.
///
/// A missing or unparsable body is treated like missing credentials.
pub async fn login_user(
    State(state): State<AppState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let LoginRequest { username, password } = payload.map(|Json(body)| body).unwrap_or_default();

    let (Some(username), Some(password)) = (
        username.filter(|value| !value.is_empty()),
        password.filter(|value| !value.is_empty()),
    ) else {
        state.record_login_metric("missing_credentials");
        return Err(ApiError::invalid_credentials());
    };

    if !state.credentials.verify(&username, &password) {
        state.record_login_metric("invalid_credentials");
        warn!(username = %username, "Rejected login with invalid credentials");
        return Err(ApiError::invalid_credentials());
    }

    let issued = state
        .token_issuer
        .issue(&username, Utc::now().timestamp())
        .map_err(|err| {
            state.record_login_metric("issue_failed");
            error!(username = %username, code = err.code(), "Unable to issue token");
            ApiError::from(err)
        })?;

    let expires_at = issued
        .expires_at()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| ApiError::internal_error("Token expiry is out of range"))?;

    state.record_login_metric("success");
    info!(username = %username, expires_at = %expires_at, "Issued token");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at,
    }))
}
