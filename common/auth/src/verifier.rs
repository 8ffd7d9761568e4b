use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::claims::Claims;
use crate::codec;
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

const EXPECTED_ALG: &str = "HS256";

#[derive(Debug, Deserialize)]
struct HeaderRepr {
    alg: String,
}

/// Recovers claims from presented tokens.
///
/// Verification is a pure function of the token, the configured secret and the
/// caller-supplied `now`; the system clock is never consulted here. Checks run in a
/// fixed order and the first failure is final:
///
/// 1. envelope decoding (`MalformedToken`)
/// 2. constant-time comparison of the signature recomputed over the presented
///    `header.payload` text (`InvalidSignature`)
/// 3. header and claims parsing (`MalformedToken`)
/// 4. expiry, `now >= exp` (`ExpiredToken`)
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: TokenConfig,
}

impl TokenVerifier {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn verify(&self, token: &str, now: i64) -> AuthResult<Claims> {
        let parts = codec::decode(token)?;

        // Compared as presented text so any altered character is a mismatch.
        let expected =
            codec::encode_segment(&codec::sign_input(parts.signing_input, &self.config.secret));
        if !bool::from(expected.as_bytes().ct_eq(parts.encoded_signature.as_bytes())) {
            return Err(AuthError::InvalidSignature);
        }

        let header: HeaderRepr =
            serde_json::from_slice(&parts.header).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != EXPECTED_ALG {
            debug!(alg = %header.alg, "rejected token with unexpected alg");
            return Err(AuthError::MalformedToken);
        }
        let claims = Claims::from_json(&parts.payload)?;

        if claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }

        debug!(expires_at = claims.expires_at, "verified token successfully");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::HEADER_JSON;
    use crate::config::Secret;
    use crate::issuer::TokenIssuer;

    fn config() -> TokenConfig {
        TokenConfig::new(Secret::new("verifier-test-secret").expect("secret"))
    }

    fn forge(header: &[u8], payload: &[u8]) -> String {
        let signature = codec::sign(header, payload, &config().secret);
        codec::encode(header, payload, &signature)
    }

    #[test]
    fn verifier_accepts_issued_token() {
        let issued = TokenIssuer::new(config())
            .issue("alice", 1_000)
            .expect("issue");
        let claims = TokenVerifier::new(config())
            .verify(&issued.token, 1_001)
            .expect("verification succeeds");
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn malformed_envelope_short_circuits() {
        let verifier = TokenVerifier::new(config());
        assert_eq!(verifier.verify("abc.def", 0), Err(AuthError::MalformedToken));
        assert_eq!(verifier.verify("", 0), Err(AuthError::MalformedToken));
    }

    #[test]
    fn signature_is_checked_before_claims() {
        // Garbage claims under a bad signature report the signature, not the payload.
        let token = codec::encode(HEADER_JSON, b"not json", b"bogus");
        let verifier = TokenVerifier::new(config());
        assert_eq!(verifier.verify(&token, 0), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn signature_is_checked_before_expiry() {
        let issued = TokenIssuer::new(config()).issue("alice", 0).expect("issue");
        let other = TokenVerifier::new(TokenConfig::new(
            Secret::new("another-secret").expect("secret"),
        ));
        assert_eq!(
            other.verify(&issued.token, i64::MAX),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn truncated_signature_is_invalid() {
        let issued = TokenIssuer::new(config()).issue("alice", 0).expect("issue");
        let (head, signature) = issued.token.rsplit_once('.').expect("segments");
        let truncated = format!("{head}.{}", &signature[..8]);
        assert_eq!(
            TokenVerifier::new(config()).verify(&truncated, 1),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn stray_trailing_bits_in_signature_are_rejected() {
        let issued = TokenIssuer::new(config()).issue("alice", 0).expect("issue");
        let (head, signature) = issued.token.rsplit_once('.').expect("segments");
        // 32 signature bytes leave two unused bits in the final symbol.
        const ALPHABET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let last = signature.as_bytes()[signature.len() - 1];
        let index = ALPHABET.iter().position(|&c| c == last).expect("alphabet symbol");
        let sibling = char::from(ALPHABET[index ^ 0x01]);
        let altered = format!("{head}.{}{sibling}", &signature[..signature.len() - 1]);

        let verifier = TokenVerifier::new(config());
        assert!(verifier.verify(&issued.token, 1).is_ok());
        assert_eq!(verifier.verify(&altered, 1), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn correctly_signed_bad_claims_are_malformed() {
        let verifier = TokenVerifier::new(config());
        let missing_exp = forge(HEADER_JSON, br#"{"sub":"alice"}"#);
        assert_eq!(verifier.verify(&missing_exp, 0), Err(AuthError::MalformedToken));

        let missing_sub = forge(HEADER_JSON, br#"{"exp":100}"#);
        assert_eq!(verifier.verify(&missing_sub, 0), Err(AuthError::MalformedToken));
    }

    #[test]
    fn header_must_declare_hs256() {
        let verifier = TokenVerifier::new(config());
        let payload = br#"{"sub":"alice","exp":100}"#;

        let none_alg = forge(br#"{"alg":"none","typ":"JWT"}"#, payload);
        assert_eq!(verifier.verify(&none_alg, 0), Err(AuthError::MalformedToken));

        let no_header = forge(b"[]", payload);
        assert_eq!(verifier.verify(&no_header, 0), Err(AuthError::MalformedToken));

        let reordered = forge(br#"{"typ":"JWT","alg":"HS256"}"#, payload);
        assert!(verifier.verify(&reordered, 0).is_ok());
    }

    #[test]
    fn expiry_has_no_grace_period() {
        let config = config().with_validity_seconds(10);
        let issued = TokenIssuer::new(config.clone())
            .issue("alice", 100)
            .expect("issue");
        let verifier = TokenVerifier::new(config);
        assert!(verifier.verify(&issued.token, 109).is_ok());
        assert_eq!(
            verifier.verify(&issued.token, 110),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn verification_is_repeatable() {
        let issued = TokenIssuer::new(config()).issue("alice", 0).expect("issue");
        let verifier = TokenVerifier::new(config());
        let first = verifier.verify(&issued.token, 5);
        let second = verifier.verify(&issued.token, 5);
        assert_eq!(first, second);
    }
}
