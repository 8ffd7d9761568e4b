use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime (one hour).
pub const DEFAULT_VALIDITY_SECONDS: u32 = 3600;

/// Shared HMAC signing secret.
///
/// Only the keyed MAC state is retained; the raw bytes are never stored or printed.
#[derive(Clone)]
pub struct Secret {
    mac: HmacSha256,
}

impl Secret {
    pub fn new(bytes: impl AsRef<[u8]>) -> AuthResult<Self> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        let mac = HmacSha256::new_from_slice(bytes).map_err(|_| AuthError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Fresh MAC instance keyed with this secret.
    pub(crate) fn mac(&self) -> HmacSha256 {
        self.mac.clone()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Runtime configuration shared by the issuer and the verifier.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: Secret,
    /// Seconds between issuance and `exp`.
    pub validity_seconds: u32,
}

impl TokenConfig {
    /// Construct config with the default one hour validity window.
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            validity_seconds: DEFAULT_VALIDITY_SECONDS,
        }
    }

    /// Adjust the validity window.
    pub fn with_validity_seconds(mut self, seconds: u32) -> Self {
        self.validity_seconds = seconds;
        self
    }
}
