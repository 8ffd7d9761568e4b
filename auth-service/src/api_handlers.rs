use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::{AuthContext, AuthError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecretResponse {
    pub message: String,
    pub secret: String,
    pub subject: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn public_message() -> Json<PublicResponse> {
    Json(PublicResponse {
        message: "This is a public endpoint, anyone can access it".to_string(),
    })
}

/// Protected route; the handler body only runs once the gate has granted access.
pub async fn secret_message(
    State(state): State<AppState>,
    auth: Result<AuthContext, AuthError>,
) -> Result<Json<SecretResponse>, AuthError> {
    let auth = match auth {
        Ok(auth) => auth,
        Err(reason) => {
            state.record_gate_metric(reason.code());
            return Err(reason);
        }
    };
    state.record_gate_metric("granted");
    info!(subject = %auth.subject(), "serving protected secret");

    Ok(Json(SecretResponse {
        message: "You have accessed the secret with JWT!".to_string(),
        secret: "The answer to life, the universe and everything is 42".to_string(),
        subject: auth.subject().to_owned(),
    }))
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Unable to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
