use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use common_auth::{AuthGate, TokenConfig, TokenIssuer, TokenVerifier};

use crate::api_handlers::{health, metrics_endpoint, public_message, secret_message};
use crate::credentials::CredentialStore;
use crate::metrics::AuthMetrics;
use crate::user_handlers::login_user;

#[derive(Clone)]
pub struct AppState {
    pub token_issuer: Arc<TokenIssuer>,
    pub auth_gate: Arc<AuthGate>,
    pub credentials: Arc<CredentialStore>,
    pub metrics: Arc<AuthMetrics>,
}

impl FromRef<AppState> for Arc<AuthGate> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_gate.clone()
    }
}

impl AppState {
    /// Issuer and gate share the same immutable token configuration.
    pub fn new(token: TokenConfig, credentials: CredentialStore, metrics: AuthMetrics) -> Self {
        Self {
            token_issuer: Arc::new(TokenIssuer::new(token.clone())),
            auth_gate: Arc::new(AuthGate::new(TokenVerifier::new(token))),
            credentials: Arc::new(credentials),
            metrics: Arc::new(metrics),
        }
    }

    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.login_attempt(outcome);
    }

    pub fn record_gate_metric(&self, outcome: &str) {
        self.metrics.gate_decision(outcome);
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/public", get(public_message))
        .route("/api/auth/login", post(login_user))
        .route("/api/secret", get(secret_message))
        .with_state(state)
}
