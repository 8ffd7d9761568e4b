pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod issuer;
pub mod verifier;

pub use claims::Claims;
pub use config::{Secret, TokenConfig, DEFAULT_VALIDITY_SECONDS};
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use gate::{parse_bearer, AuthDecision, AuthGate};
pub use issuer::{IssuedToken, TokenIssuer};
pub use verifier::TokenVerifier;
