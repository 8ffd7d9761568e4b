use anyhow::{anyhow, Context, Result};
use common_auth::{Secret, TokenConfig, DEFAULT_VALIDITY_SECONDS};
use std::env;

use crate::credentials::CredentialStore;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub credentials: CredentialStore,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    load_from(|key| env::var(key).ok())
}

/// Build the configuration from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;
    if secret.trim().is_empty() {
        return Err(anyhow!("JWT_SECRET must not be empty"));
    }
    // Key bytes are used exactly as configured, surrounding whitespace included.
    let secret = Secret::new(secret.as_bytes()).context("JWT_SECRET must not be empty")?;

    let validity_seconds = match lookup("JWT_VALIDITY_SECONDS").and_then(|v| normalize_optional(&v)) {
        Some(value) => parse_validity(&value).context("Failed to parse JWT_VALIDITY_SECONDS")?,
        None => DEFAULT_VALIDITY_SECONDS,
    };

    let credentials = match lookup("AUTH_USERS") {
        Some(value) => CredentialStore::parse(&value).context("Failed to parse AUTH_USERS")?,
        None => CredentialStore::new(),
    };

    let host = lookup("HOST")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match lookup("PORT").and_then(|value| normalize_optional(&value)) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid PORT '{value}'"))?,
        None => DEFAULT_PORT,
    };

    Ok(ServiceConfig {
        host,
        port,
        token: TokenConfig::new(secret).with_validity_seconds(validity_seconds),
        credentials,
    })
}

fn parse_validity(value: &str) -> Result<u32> {
    let seconds: u32 = value
        .parse()
        .map_err(|err| anyhow!("Invalid validity window '{value}': {err}"))?;
    if seconds == 0 {
        return Err(anyhow!("Validity window must be greater than zero"));
    }
    Ok(seconds)
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
